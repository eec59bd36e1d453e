//! Search payload extraction

use crate::error::ValidationError;
use crate::query::RawSearchRequest;
use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Query, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde_json::{Map, Value};

/// A search request from a JSON body, an urlencoded or multipart form,
/// or the query string when the request carries no body type
#[derive(Debug)]
pub struct SearchPayload(pub RawSearchRequest);

#[async_trait]
impl<S> FromRequest<S> for SearchPayload
where
    S: Send + Sync,
{
    type Rejection = ValidationError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase());

        let raw = match content_type.as_deref() {
            None => {
                let Query(raw) = Query::<RawSearchRequest>::try_from_uri(req.uri())
                    .map_err(|e| ValidationError::MalformedRequest(e.body_text()))?;
                raw
            }
            Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
                let Form(raw) = Form::<RawSearchRequest>::from_request(req, state)
                    .await
                    .map_err(|e| ValidationError::MalformedRequest(e.body_text()))?;
                raw
            }
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| ValidationError::MalformedRequest(e.body_text()))?;
                from_multipart(multipart).await?
            }
            Some(_) => {
                let Json(raw) = Json::<RawSearchRequest>::from_request(req, state)
                    .await
                    .map_err(|e| ValidationError::MalformedRequest(e.body_text()))?;
                raw
            }
        };

        Ok(SearchPayload(raw))
    }
}

/// Collect the text fields of a multipart form. The first value of a
/// repeated field wins.
async fn from_multipart(mut multipart: Multipart) -> Result<RawSearchRequest, ValidationError> {
    let mut fields = Map::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ValidationError::MalformedRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| ValidationError::MalformedRequest(e.body_text()))?;
        fields.entry(name).or_insert(Value::String(value));
    }

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ValidationError::MalformedRequest(e.to_string()))
}
