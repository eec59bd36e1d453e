//! Amazon Product Advertising API 5.0 item search
//!
//! Requests are JSON `SearchItems` calls signed with AWS Signature V4.
//! Price filters are sent in the lowest currency denomination, so yen
//! bounds are multiplied by 100.

mod response;
pub mod sign;

pub use response::*;

use super::traits::*;
use crate::config::AmazonConfig;
use crate::error::DispatchError;
use crate::query::{SortOrder, ValidatedSearchRequest};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sign::SigningKey;
use url::Url;

const SEARCH_PATH: &str = "/paapi5/searchitems";
const SERVICE: &str = "ProductAdvertisingAPI";
const TARGET: &str = "com.amazon.paapi5.v1.ProductAdvertisingAPIv1.SearchItems";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Items per page requested from Amazon
pub const AMAZON_ITEM_COUNT: u32 = 10;

/// Resources always requested: images, item info and offers
pub const RESOURCES: &[&str] = &[
    "Images.Primary.Small",
    "Images.Primary.Medium",
    "Images.Primary.Large",
    "Images.Variants.Small",
    "Images.Variants.Medium",
    "Images.Variants.Large",
    "ItemInfo.ByLineInfo",
    "ItemInfo.ContentInfo",
    "ItemInfo.ContentRating",
    "ItemInfo.Classifications",
    "ItemInfo.ExternalIds",
    "ItemInfo.Features",
    "ItemInfo.ManufactureInfo",
    "ItemInfo.ProductInfo",
    "ItemInfo.TechnicalInfo",
    "ItemInfo.Title",
    "ItemInfo.TradeInInfo",
    "Offers.Listings.Availability.Message",
    "Offers.Listings.Condition",
    "Offers.Listings.DeliveryInfo.IsPrimeEligible",
    "Offers.Listings.MerchantInfo",
    "Offers.Listings.Price",
    "Offers.Listings.SavingBasis",
    "Offers.Summaries.HighestPrice",
    "Offers.Summaries.LowestPrice",
    "Offers.Summaries.OfferCount",
];

/// Marketplace domain -> (API host, signing region, currency)
const MARKETPLACES: &[(&str, &str, &str, &str)] = &[
    ("www.amazon.co.jp", "webservices.amazon.co.jp", "us-west-2", "JPY"),
    ("www.amazon.com", "webservices.amazon.com", "us-east-1", "USD"),
    ("www.amazon.ca", "webservices.amazon.ca", "us-east-1", "CAD"),
    ("www.amazon.co.uk", "webservices.amazon.co.uk", "eu-west-1", "GBP"),
    ("www.amazon.de", "webservices.amazon.de", "eu-west-1", "EUR"),
    ("www.amazon.fr", "webservices.amazon.fr", "eu-west-1", "EUR"),
];

/// `SearchItems` request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AmazonQuery {
    pub keywords: String,
    pub partner_tag: String,
    pub partner_type: &'static str,
    pub marketplace: String,
    pub item_count: u32,
    pub resources: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_of_preference: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<&'static str>,
}

/// Amazon PA-API provider
pub struct Amazon {
    config: AmazonConfig,
    url: String,
    host: String,
    region: String,
    currency: Option<&'static str>,
}

impl Amazon {
    /// Create the provider, resolving host and region from the marketplace
    pub fn new(config: AmazonConfig) -> Result<Self> {
        let known = MARKETPLACES
            .iter()
            .find(|(domain, ..)| *domain == config.marketplace);

        let api_host = config
            .host
            .clone()
            .or_else(|| known.map(|(_, host, ..)| host.to_string()))
            .ok_or_else(|| anyhow!("unknown Amazon marketplace {}", config.marketplace))?;
        let region = config
            .region
            .clone()
            .or_else(|| known.map(|(_, _, region, _)| region.to_string()))
            .ok_or_else(|| anyhow!("no signing region for marketplace {}", config.marketplace))?;
        let currency = known.map(|(.., currency)| *currency);

        let base = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}", api_host));
        let parsed = Url::parse(&base)?.join(SEARCH_PATH)?;
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(h), Some(port)) => format!("{}:{}", h, port),
            (Some(h), None) => h.to_string(),
            (None, _) => return Err(anyhow!("Amazon endpoint {} has no host", base)),
        };

        Ok(Self {
            config,
            url: parsed.to_string(),
            host,
            region,
            currency,
        })
    }

    /// Build the signed HTTP request as of `now`
    pub fn signed_request(
        &self,
        query: &AmazonQuery,
        now: DateTime<Utc>,
    ) -> Result<ProviderRequest, DispatchError> {
        let body = serde_json::to_vec(query)
            .map_err(|e| DispatchError::Transport(format!("failed to encode request: {}", e)))?;

        let signed = vec![
            ("content-encoding".to_string(), "amz-1.0".to_string()),
            ("content-type".to_string(), CONTENT_TYPE.to_string()),
            ("host".to_string(), self.host.clone()),
            ("x-amz-date".to_string(), sign::amz_date(now)),
            ("x-amz-target".to_string(), TARGET.to_string()),
        ];
        let authorization = sign::authorization(
            SigningKey {
                access_key: &self.config.access_key,
                secret_key: &self.config.secret_key,
                region: &self.region,
                service: SERVICE,
            },
            "POST",
            SEARCH_PATH,
            &signed,
            &body,
            now,
        );

        // reqwest derives the Host header from the URL
        let mut request = ProviderRequest::post(&self.url);
        for (name, value) in signed.into_iter().filter(|(name, _)| name != "host") {
            request = request.header(name, value);
        }
        Ok(request
            .header("Authorization", authorization)
            .header("Accept", "application/json")
            .body(body))
    }
}

impl Provider for Amazon {
    type Query = AmazonQuery;
    type Response = SearchItemsResponse;

    fn kind(&self) -> ProviderKind {
        ProviderKind::Amazon
    }

    fn build(&self, request: &ValidatedSearchRequest) -> AmazonQuery {
        let sort_by = match request.sort() {
            SortOrder::Default => None,
            SortOrder::PriceAscending => Some("Price:LowToHigh"),
            SortOrder::PriceDescending => Some("Price:HighToLow"),
        };

        AmazonQuery {
            keywords: request.keyword().to_string(),
            partner_tag: self.config.associate_tag.clone(),
            partner_type: "Associates",
            marketplace: self.config.marketplace.clone(),
            item_count: AMAZON_ITEM_COUNT,
            resources: RESOURCES.to_vec(),
            currency_of_preference: self.currency,
            min_price: request.min_bound().map(|p| u64::from(p) * 100),
            max_price: request.max_bound().map(|p| u64::from(p) * 100),
            sort_by,
        }
    }

    fn request(&self, query: &AmazonQuery) -> Result<ProviderRequest, DispatchError> {
        self.signed_request(query, Utc::now())
    }

    fn response(&self, response: ProviderResponse) -> Result<SearchItemsResponse, DispatchError> {
        if !response.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&response.text)
                .ok()
                .and_then(|envelope| envelope.message());
            return Err(response.upstream_error(message));
        }

        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::RawSearchRequest;
    use chrono::TimeZone;

    fn config() -> AmazonConfig {
        AmazonConfig {
            associate_tag: "example-22".to_string(),
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            ..Default::default()
        }
    }

    fn provider() -> Amazon {
        Amazon::new(config()).unwrap()
    }

    fn validated(raw: RawSearchRequest) -> ValidatedSearchRequest {
        raw.validate().unwrap()
    }

    #[test]
    fn test_keyword_only_query() {
        let query = provider().build(&validated(RawSearchRequest::keyword("shoes")));

        assert_eq!(query.keywords, "shoes");
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, None);
        assert_eq!(query.sort_by, None);
        assert_eq!(query.item_count, AMAZON_ITEM_COUNT);

        let body = serde_json::to_value(&query).unwrap();
        assert!(body.get("MinPrice").is_none());
        assert!(body.get("MaxPrice").is_none());
        assert!(body.get("SortBy").is_none());
    }

    #[test]
    fn test_prices_are_converted_to_minor_units() {
        let query = provider().build(&validated(
            RawSearchRequest::keyword("shoes").with_prices(500, 0),
        ));
        assert_eq!(query.min_price, Some(50000));
        assert_eq!(query.max_price, None);

        let query = provider().build(&validated(
            RawSearchRequest::keyword("shoes").with_prices(0, 3000),
        ));
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, Some(300000));
    }

    #[test]
    fn test_largest_price_does_not_overflow() {
        let query = provider().build(&validated(
            RawSearchRequest::keyword("shoes").with_prices(0, i64::from(u32::MAX)),
        ));
        assert_eq!(query.max_price, Some(u64::from(u32::MAX) * 100));
    }

    #[test]
    fn test_sort_vocabulary() {
        let p = provider();
        let asc = p.build(&validated(RawSearchRequest::keyword("shoes").with_sort("price_asc")));
        let desc = p.build(&validated(RawSearchRequest::keyword("shoes").with_sort("price_desc")));

        assert_eq!(asc.sort_by, Some("Price:LowToHigh"));
        assert_eq!(desc.sort_by, Some("Price:HighToLow"));
    }

    #[test]
    fn test_fixed_resources_and_partner() {
        let query = provider().build(&validated(RawSearchRequest::keyword("shoes")));

        assert_eq!(query.partner_tag, "example-22");
        assert_eq!(query.partner_type, "Associates");
        assert_eq!(query.marketplace, "www.amazon.co.jp");
        assert_eq!(query.currency_of_preference, Some("JPY"));
        assert!(query.resources.iter().any(|r| r.starts_with("Images.")));
        assert!(query.resources.iter().any(|r| r.starts_with("ItemInfo.")));
        assert!(query.resources.iter().any(|r| r.starts_with("Offers.")));
    }

    #[test]
    fn test_build_is_deterministic() {
        let p = provider();
        let req = validated(
            RawSearchRequest::keyword("shoes")
                .with_prices(100, 900)
                .with_sort("price_desc"),
        );
        assert_eq!(p.build(&req), p.build(&req));

        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 45).unwrap();
        assert_eq!(
            p.signed_request(&p.build(&req), now).unwrap(),
            p.signed_request(&p.build(&req), now).unwrap()
        );
    }

    #[test]
    fn test_signed_request() {
        let p = provider();
        let query = p.build(&validated(RawSearchRequest::keyword("shoes")));
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 45).unwrap();
        let request = p.signed_request(&query, now).unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://webservices.amazon.co.jp/paapi5/searchitems");
        assert_eq!(request.header_value("x-amz-date"), Some("20240115T123045Z"));
        assert_eq!(request.header_value("x-amz-target"), Some(TARGET));
        assert_eq!(request.header_value("host"), None);

        let auth = request.header_value("authorization").unwrap();
        assert!(auth.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240115/us-west-2/ProductAdvertisingAPI/aws4_request"
        ));
        assert!(!auth.contains("wJalrXUtnFEMI"));

        let body: serde_json::Value =
            serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["Keywords"], "shoes");
        assert_eq!(body["PartnerTag"], "example-22");
        assert_eq!(body["ItemCount"], 10);
    }

    #[test]
    fn test_endpoint_override_keeps_port_for_signing() {
        let p = Amazon::new(AmazonConfig {
            endpoint: Some("http://127.0.0.1:8181".to_string()),
            ..config()
        })
        .unwrap();

        assert_eq!(p.url, "http://127.0.0.1:8181/paapi5/searchitems");
        assert_eq!(p.host, "127.0.0.1:8181");
        assert_eq!(p.region, "us-west-2");
    }

    #[test]
    fn test_unknown_marketplace() {
        let err = Amazon::new(AmazonConfig {
            marketplace: "www.amazon.example".to_string(),
            ..config()
        });
        assert!(err.is_err());

        let p = Amazon::new(AmazonConfig {
            marketplace: "www.amazon.example".to_string(),
            host: Some("webservices.amazon.example".to_string()),
            region: Some("eu-west-1".to_string()),
            ..config()
        })
        .unwrap();
        assert_eq!(p.currency, None);
    }

    #[test]
    fn test_decode_response_keeps_unknown_fields() {
        let body = r#"{
            "SearchResult": {
                "Items": [{
                    "ASIN": "B0EXAMPLE1",
                    "DetailPageURL": "https://www.amazon.co.jp/dp/B0EXAMPLE1?tag=example-22",
                    "ItemInfo": {"Title": {"DisplayValue": "Running shoes"}}
                }],
                "SearchRefinements": {},
                "SearchURL": "https://www.amazon.co.jp/s?k=shoes",
                "TotalResultCount": 146
            }
        }"#;

        let decoded = provider()
            .response(ProviderResponse::new(200, body))
            .unwrap();
        let result = decoded.search_result.as_ref().unwrap();
        assert_eq!(result.total_result_count, Some(146));
        assert_eq!(result.items[0].asin, "B0EXAMPLE1");

        let value = serde_json::to_value(&decoded).unwrap();
        assert_eq!(
            value["SearchResult"]["Items"][0]["ItemInfo"]["Title"]["DisplayValue"],
            "Running shoes"
        );
        assert!(value["SearchResult"].get("SearchRefinements").is_some());
        assert!(value.get("Errors").is_none());
    }

    #[test]
    fn test_relay_keeps_nulls_and_empty_arrays() {
        let body = serde_json::json!({
            "Errors": [],
            "SearchResult": {"Items": [], "TotalResultCount": null}
        });

        let decoded = provider()
            .response(ProviderResponse::new(200, body.to_string()))
            .unwrap();
        assert!(decoded.errors.is_empty());
        assert_eq!(decoded.search_result.as_ref().unwrap().total_result_count, None);
        assert_eq!(serde_json::to_value(&decoded).unwrap(), body);
    }

    #[test]
    fn test_decode_wrong_shape() {
        let err = provider()
            .response(ProviderResponse::new(200, r#"{"SearchResult": {"Items": "none"}}"#))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Decode(_)));
    }

    #[test]
    fn test_error_body() {
        let body = r#"{"__type":"com.amazon.paapi5#ErrorData","Errors":[{"Code":"InvalidSignature","Message":"The request has not been correctly signed."}]}"#;
        let err = provider()
            .response(ProviderResponse::new(401, body))
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::Upstream {
                status: 401,
                message: "InvalidSignature: The request has not been correctly signed.".to_string()
            }
        );
    }
}
