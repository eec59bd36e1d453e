//! Configuration module for affiliate-search
//!
//! Handles loading and validating settings from YAML files and environment
//! variables. Settings are loaded once at startup and handed to the
//! components that need them; nothing reads configuration from a global.

mod settings;

pub use settings::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment variable naming the settings file
pub const CONFIG_PATH_ENV: &str = "AFFILIATE_SEARCH_CONFIG";

/// Load settings.
///
/// An explicit path must exist. Otherwise the `AFFILIATE_SEARCH_CONFIG`
/// variable and then the default locations are tried, falling back to
/// defaults. Environment overrides are merged last and the result is
/// validated.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match find_config(explicit)? {
        Some(path) => {
            info!("Loading settings from: {}", path.display());
            Settings::from_file(&path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => {
            info!("No settings file found, using defaults");
            Settings::default()
        }
    };

    settings.merge_env();
    settings.validate()?;
    Ok(settings)
}

fn find_config(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("config file {} does not exist", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    Ok(default_paths().into_iter().find(|p| p.exists()))
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("config.yaml"),
        PathBuf::from("config/config.yaml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("affiliate-search/config.yaml"));
    }
    paths
}
