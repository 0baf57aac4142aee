use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_max_results_per_site")]
    pub max_results_per_site: u32,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_max_results_per_site() -> u32 {
    3
}

fn default_use_cache() -> bool {
    true
}

impl SearchRequest {
    pub fn new(query: &str, max_results_per_site: u32, use_cache: bool) -> SearchRequest {
        SearchRequest {
            query: query.trim().to_string(),
            max_results_per_site,
            use_cache,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub site: String,
    pub product_name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// ISO-8601 timestamp as produced by the backend.
    pub extracted_at: String,
    #[serde(default)]
    pub extraction_confidence: Option<f64>,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Lifecycle status reported by the backend. The set is open: values we don't
/// know about are carried verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum SearchStatus {
    Pending,
    Completed,
    Failed,
    Other(String),
}

impl SearchStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SearchStatus::Pending => "pending",
            SearchStatus::Completed => "completed",
            SearchStatus::Failed => "failed",
            SearchStatus::Other(s) => s,
        }
    }
}

impl From<String> for SearchStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => SearchStatus::Pending,
            "completed" => SearchStatus::Completed,
            "failed" => SearchStatus::Failed,
            _ => SearchStatus::Other(value),
        }
    }
}

impl From<SearchStatus> for String {
    fn from(value: SearchStatus) -> Self {
        match value {
            SearchStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub search_id: i64,
    pub query: String,
    pub status: SearchStatus,
    pub results: Vec<Product>,
    pub total_found: u64,
    #[serde(default)]
    pub search_time_ms: Option<u64>,
    #[serde(default)]
    pub sites_searched: Vec<String>,
    #[serde(default)]
    pub cached_results: u64,
    #[serde(default)]
    pub fresh_results: u64,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceInfo {
    pub message: String,
    pub description: String,
    pub version: String,
    pub ai_provider: String,
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub ai_provider: String,
    #[serde(default)]
    pub services: BTreeMap<String, String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SiteStatus {
    pub site: String,
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SupportedSites {
    pub supported_sites: Vec<SiteStatus>,
    pub total_sites: usize,
    pub ai_provider: String,
}

#[test]
fn test_search_response_decodes_backend_payload() {
    let body = r#"{
        "search_id": 1,
        "query": "airpods pro",
        "status": "completed",
        "results": [
            {"id": 4, "site": "bestbuy.com", "product_name": "AirPods Pro", "price": 229.99,
             "currency": "USD", "product_url": "https://bestbuy.com/x", "image_url": null,
             "extracted_at": "2024-05-01T10:00:00.000001", "extraction_confidence": 0.96},
            {"id": 5, "site": "walmart.com", "product_name": "AirPods Pro USB-C",
             "extracted_at": "2024-05-01T10:00:00"}
        ],
        "total_found": 2,
        "search_time_ms": 2004,
        "sites_searched": ["amazon.com", "bestbuy.com", "walmart.com"],
        "cached_results": 0,
        "fresh_results": 2,
        "error_message": null
    }"#;

    let response: SearchResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.status, SearchStatus::Completed);
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].site, "bestbuy.com");
    assert_eq!(response.results[1].price, None);
    assert_eq!(response.results[1].currency, "USD");
    assert_eq!(response.search_time_ms, Some(2004));
}

#[test]
fn test_unknown_status_is_preserved() {
    let status: SearchStatus = serde_json::from_str(r#""queued""#).unwrap();
    assert_eq!(status, SearchStatus::Other("queued".to_string()));
    assert_eq!(serde_json::to_string(&status).unwrap(), r#""queued""#);
    assert_eq!(
        serde_json::to_string(&SearchStatus::Failed).unwrap(),
        r#""failed""#
    );
}
