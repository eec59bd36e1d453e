//! Rakuten Ichiba item search
//!
//! Uses the Rakuten Web Service `IchibaItem/Search` API. Prices are passed
//! through in yen and the page size is fixed.

use super::traits::*;
use crate::config::RakutenConfig;
use crate::error::DispatchError;
use crate::query::{SortOrder, ValidatedSearchRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_ENDPOINT: &str = "https://app.rakuten.co.jp";
const SEARCH_PATH: &str = "/services/api/IchibaItem/Search/20220601";

/// Items per page requested from Rakuten
pub const RAKUTEN_HITS: u32 = 10;

/// Query parameters for one Ichiba item search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RakutenQuery {
    pub application_id: String,
    pub affiliate_id: Option<String>,
    pub keyword: String,
    pub hits: u32,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub sort: Option<&'static str>,
}

impl RakutenQuery {
    /// Ordered query string pairs, unset filters left out
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("applicationId".to_string(), self.application_id.clone()),
            ("format".to_string(), "json".to_string()),
            ("keyword".to_string(), self.keyword.clone()),
            ("hits".to_string(), self.hits.to_string()),
        ];
        if let Some(ref affiliate_id) = self.affiliate_id {
            params.push(("affiliateId".to_string(), affiliate_id.clone()));
        }
        if let Some(min) = self.min_price {
            params.push(("minPrice".to_string(), min.to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("maxPrice".to_string(), max.to_string()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort".to_string(), sort.to_string()));
        }
        params
    }
}

/// Decoded `IchibaItem/Search` response (format version 1).
///
/// The typed fields are a checked view of the body; serializing emits the
/// body exactly as Rakuten sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct IchibaItemResponse {
    pub count: u64,
    pub page: u32,
    pub hits: u32,
    pub page_count: u32,
    pub items: Vec<IchibaItemEntry>,
    raw: Value,
}

impl IchibaItemResponse {
    /// The body as received
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

#[derive(Deserialize)]
struct IchibaItemView {
    #[serde(default)]
    count: u64,
    #[serde(default)]
    page: u32,
    #[serde(default)]
    hits: u32,
    #[serde(rename = "pageCount", default)]
    page_count: u32,
    #[serde(rename = "Items")]
    items: Vec<IchibaItemEntry>,
}

impl TryFrom<Value> for IchibaItemResponse {
    type Error = serde_json::Error;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        let view = IchibaItemView::deserialize(&raw)?;
        Ok(Self {
            count: view.count,
            page: view.page,
            hits: view.hits,
            page_count: view.page_count,
            items: view.items,
            raw,
        })
    }
}

impl From<IchibaItemResponse> for Value {
    fn from(response: IchibaItemResponse) -> Value {
        response.raw
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IchibaItemEntry {
    #[serde(rename = "Item")]
    pub item: IchibaItem,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IchibaItem {
    pub item_name: String,
    pub item_code: String,
    pub item_price: u64,
    pub item_url: String,
    #[serde(default)]
    pub affiliate_url: Option<String>,
    #[serde(default)]
    pub shop_name: Option<String>,
}

/// Error body, both the legacy and the current API shape
#[derive(Debug, Deserialize)]
struct RakutenErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    errors: Option<RakutenErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RakutenErrorDetail {
    error_code: Option<Value>,
    error_message: Option<String>,
}

impl RakutenErrorBody {
    fn message(self) -> Option<String> {
        if let Some(detail) = self.errors {
            return detail.error_message.map(|msg| match detail.error_code {
                Some(code) => format!("{}: {}", code, msg),
                None => msg,
            });
        }
        match (self.error, self.error_description) {
            (Some(code), Some(desc)) => Some(format!("{}: {}", code, desc)),
            (Some(code), None) => Some(code),
            (None, desc) => desc,
        }
    }
}

/// Rakuten Ichiba provider
pub struct Rakuten {
    config: RakutenConfig,
    url: String,
}

impl Rakuten {
    pub fn new(config: RakutenConfig) -> Self {
        let base = config
            .endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim_end_matches('/');
        let url = format!("{}{}", base, SEARCH_PATH);
        Self { config, url }
    }
}

impl Provider for Rakuten {
    type Query = RakutenQuery;
    type Response = IchibaItemResponse;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Rakuten
    }

    fn build(&self, request: &ValidatedSearchRequest) -> RakutenQuery {
        let sort = match request.sort() {
            SortOrder::Default => None,
            SortOrder::PriceAscending => Some("+itemPrice"),
            SortOrder::PriceDescending => Some("-itemPrice"),
        };

        RakutenQuery {
            application_id: self.config.application_id.clone(),
            affiliate_id: Some(self.config.affiliate_id.clone()).filter(|id| !id.is_empty()),
            keyword: request.keyword().to_string(),
            hits: RAKUTEN_HITS,
            min_price: request.min_bound(),
            max_price: request.max_bound(),
            sort,
        }
    }

    fn request(&self, query: &RakutenQuery) -> Result<ProviderRequest, DispatchError> {
        let mut request =
            ProviderRequest::get(&self.url).header("Accept", "application/json");
        request.params = query.to_params();
        Ok(request)
    }

    fn response(&self, response: ProviderResponse) -> Result<IchibaItemResponse, DispatchError> {
        if !response.is_success() {
            let message = serde_json::from_str::<RakutenErrorBody>(&response.text)
                .ok()
                .and_then(RakutenErrorBody::message);
            return Err(response.upstream_error(message));
        }

        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RawSearchRequest;

    fn provider() -> Rakuten {
        Rakuten::new(RakutenConfig {
            application_id: "1012345678901234567".to_string(),
            affiliate_id: "1a2b3c4d.5e6f7a8b".to_string(),
            ..Default::default()
        })
    }

    fn validated(raw: RawSearchRequest) -> ValidatedSearchRequest {
        raw.validate().unwrap()
    }

    #[test]
    fn test_keyword_only_query() {
        let query = provider().build(&validated(RawSearchRequest::keyword("shoes")));

        assert_eq!(query.keyword, "shoes");
        assert_eq!(query.hits, RAKUTEN_HITS);
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, None);
        assert_eq!(query.sort, None);

        let params = query.to_params();
        assert!(!params.iter().any(|(k, _)| k == "minPrice" || k == "maxPrice" || k == "sort"));
    }

    #[test]
    fn test_prices_are_passed_in_yen() {
        let query = provider().build(&validated(
            RawSearchRequest::keyword("shoes").with_prices(500, 3000),
        ));
        assert_eq!(query.min_price, Some(500));
        assert_eq!(query.max_price, Some(3000));
    }

    #[test]
    fn test_sort_vocabulary() {
        let p = provider();
        let asc = p.build(&validated(RawSearchRequest::keyword("shoes").with_sort("price_asc")));
        let desc = p.build(&validated(RawSearchRequest::keyword("shoes").with_sort("price_desc")));
        let default = p.build(&validated(RawSearchRequest::keyword("shoes").with_sort("default")));

        assert_eq!(asc.sort, Some("+itemPrice"));
        assert_eq!(desc.sort, Some("-itemPrice"));
        assert_eq!(default.sort, None);
    }

    #[test]
    fn test_build_is_deterministic() {
        let p = provider();
        let req = validated(
            RawSearchRequest::keyword("shoes")
                .with_prices(100, 900)
                .with_sort("price_asc"),
        );
        assert_eq!(p.build(&req), p.build(&req));
        assert_eq!(p.request(&p.build(&req)), p.request(&p.build(&req)));
    }

    #[test]
    fn test_http_request() {
        let p = provider();
        let query = p.build(&validated(
            RawSearchRequest::keyword("shoes").with_prices(500, 0).with_sort("price_desc"),
        ));
        let request = p.request(&query).unwrap();

        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.url,
            "https://app.rakuten.co.jp/services/api/IchibaItem/Search/20220601"
        );
        assert_eq!(request.param_value("applicationId"), Some("1012345678901234567"));
        assert_eq!(request.param_value("affiliateId"), Some("1a2b3c4d.5e6f7a8b"));
        assert_eq!(request.param_value("minPrice"), Some("500"));
        assert_eq!(request.param_value("maxPrice"), None);
        assert_eq!(request.param_value("sort"), Some("-itemPrice"));
        assert_eq!(request.param_value("hits"), Some("10"));
    }

    #[test]
    fn test_affiliate_id_is_optional() {
        let p = Rakuten::new(RakutenConfig {
            application_id: "app".to_string(),
            ..Default::default()
        });
        let query = p.build(&validated(RawSearchRequest::keyword("shoes")));
        assert_eq!(query.affiliate_id, None);
    }

    #[test]
    fn test_endpoint_override() {
        let p = Rakuten::new(RakutenConfig {
            application_id: "app".to_string(),
            endpoint: Some("http://127.0.0.1:9999/".to_string()),
            ..Default::default()
        });
        let query = p.build(&validated(RawSearchRequest::keyword("shoes")));
        assert_eq!(
            p.request(&query).unwrap().url,
            "http://127.0.0.1:9999/services/api/IchibaItem/Search/20220601"
        );
    }

    #[test]
    fn test_decode_response_keeps_unknown_fields() {
        let body = r#"{
            "count": 1, "page": 1, "first": 1, "last": 1, "hits": 1, "carrier": 0, "pageCount": 1,
            "Items": [{"Item": {
                "itemName": "Running shoes", "itemCode": "shop:10000001", "itemPrice": 4980,
                "itemUrl": "https://item.rakuten.co.jp/shop/10000001/",
                "shopName": "Shoe Shop", "reviewAverage": 4.5
            }}],
            "GenreInformation": [], "TagInformation": []
        }"#;

        let decoded = provider()
            .response(ProviderResponse::new(200, body))
            .unwrap();
        assert_eq!(decoded.count, 1);
        assert_eq!(decoded.items[0].item.item_price, 4980);

        let value = serde_json::to_value(&decoded).unwrap();
        assert_eq!(value["carrier"], 0);
        assert_eq!(value["Items"][0]["Item"]["reviewAverage"], 4.5);
        assert_eq!(value["Items"][0]["Item"]["shopName"], "Shoe Shop");
    }

    #[test]
    fn test_relay_keeps_nulls_and_empty_arrays() {
        let body = serde_json::json!({
            "count": 1, "page": 1, "hits": 1, "pageCount": 1,
            "Items": [{"Item": {
                "itemName": "Running shoes", "itemCode": "shop:10000001", "itemPrice": 4980,
                "itemUrl": "https://item.rakuten.co.jp/shop/10000001/",
                "affiliateUrl": null, "shopName": null, "mediumImageUrls": []
            }}],
            "GenreInformation": []
        });

        let decoded = provider()
            .response(ProviderResponse::new(200, body.to_string()))
            .unwrap();
        assert_eq!(decoded.items[0].item.shop_name, None);
        assert_eq!(serde_json::to_value(&decoded).unwrap(), body);
    }

    #[test]
    fn test_decode_wrong_shape() {
        let err = provider()
            .response(ProviderResponse::new(200, r#"{"count": 3}"#))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Decode(_)));
    }

    #[test]
    fn test_error_body() {
        let body = r#"{"error":"wrong_parameter","error_description":"specify valid applicationId"}"#;
        let err = provider()
            .response(ProviderResponse::new(400, body))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::Upstream {
                status: 400,
                message: "wrong_parameter: specify valid applicationId".to_string()
            }
        );

        let body = r#"{"errors":{"errorCode":429,"errorMessage":"Too many requests"}}"#;
        let err = provider()
            .response(ProviderResponse::new(429, body))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::Upstream {
                status: 429,
                message: "429: Too many requests".to_string()
            }
        );
    }
}
