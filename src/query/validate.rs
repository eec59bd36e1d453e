//! Request validation

use super::models::{RawSearchRequest, SortOrder, ValidatedSearchRequest};
use crate::error::ValidationError;

impl RawSearchRequest {
    /// Validate the raw fields and produce the canonical request.
    ///
    /// Checks run in a fixed order, so a request with several problems
    /// always reports the same one: keyword, sign of each bound, size of
    /// each bound, range ordering, then sort.
    pub fn validate(self) -> Result<ValidatedSearchRequest, ValidationError> {
        let keyword = self
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ValidationError::MissingKeyword)?
            .to_string();

        let raw_min = self.min_price.unwrap_or(0);
        let raw_max = self.max_price.unwrap_or(0);

        if raw_min < 0 {
            return Err(ValidationError::NegativePrice { field: "minPrice" });
        }
        if raw_max < 0 {
            return Err(ValidationError::NegativePrice { field: "maxPrice" });
        }

        let min_price = u32::try_from(raw_min)
            .map_err(|_| ValidationError::PriceTooLarge { field: "minPrice" })?;
        let max_price = u32::try_from(raw_max)
            .map_err(|_| ValidationError::PriceTooLarge { field: "maxPrice" })?;

        // 0 is "unbounded", so only two real bounds can be out of order
        if min_price > 0 && max_price > 0 && min_price > max_price {
            return Err(ValidationError::PriceRangeInverted {
                min: min_price,
                max: max_price,
            });
        }

        let sort = match self.sort.as_deref() {
            None | Some("") => SortOrder::Default,
            Some(token) => SortOrder::from_token(token)
                .ok_or_else(|| ValidationError::InvalidSort(token.to_string()))?,
        };

        Ok(ValidatedSearchRequest::new(keyword, min_price, max_price, sort))
    }
}
