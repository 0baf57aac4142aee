use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

use pricefind::api::create_router;
use pricefind::catalog::Catalog;
use pricefind::data_models::{HealthReport, SearchResponse, SearchStatus, SupportedSites};

mod test_helpers {
    use super::*;

    pub fn router() -> Router {
        create_router(Arc::new(Catalog::new(Duration::ZERO)))
    }

    pub fn search_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/search/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub async fn read_json<T: DeserializeOwned>(res: axum::response::Response) -> T {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_search_known_product() {
    let res = router()
        .oneshot(search_request(serde_json::json!({
            "query": "AirPods Pro",
            "max_results_per_site": 3,
            "use_cache": true
        })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: SearchResponse = read_json(res).await;
    assert_eq!(body.status, SearchStatus::Completed);
    assert_eq!(body.query, "AirPods Pro");
    assert_eq!(body.total_found, 6);
    assert_eq!(body.fresh_results, 6);
    assert_eq!(body.results.len(), 6);
    assert_eq!(body.sites_searched, ["amazon.com", "bestbuy.com", "walmart.com"]);
    assert!(body.search_time_ms.is_some());
    assert!(body.results.iter().all(|p| p.product_name.contains("AirPods")));

    let prices: Vec<f64> = body.results.iter().map(|p| p.price.unwrap()).collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]), "not sorted: {prices:?}");
    assert_eq!(prices[0], 229.99);
}

#[tokio::test]
async fn test_search_caps_results_per_site() {
    let res = router()
        .oneshot(search_request(serde_json::json!({
            "query": "nintendo switch",
            "max_results_per_site": 1
        })))
        .await
        .unwrap();
    let body: SearchResponse = read_json(res).await;

    assert_eq!(body.total_found, 3);
    let mut sites: Vec<&str> = body.results.iter().map(|p| p.site.as_str()).collect();
    sites.sort();
    assert_eq!(sites, ["amazon.com", "bestbuy.com", "walmart.com"]);
}

#[tokio::test]
async fn test_search_unknown_product_is_generated() {
    let res = router()
        .oneshot(search_request(serde_json::json!({ "query": "gaming monitor" })))
        .await
        .unwrap();
    let body: SearchResponse = read_json(res).await;

    assert_eq!(body.total_found, 6);
    for product in &body.results {
        assert!(product.product_name.starts_with("gaming monitor"));
        assert!(product.product_url.is_some());
        assert_eq!(product.currency, "USD");
    }
}

#[tokio::test]
async fn test_empty_query_is_bad_request() {
    let res = router()
        .oneshot(search_request(serde_json::json!({ "query": "   " })))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = read_json(res).await;
    assert_eq!(body["detail"], "Query cannot be empty");
}

#[tokio::test]
async fn test_search_ids_increase() {
    let app = router();
    let mut ids = Vec::new();
    for _ in 0..3 {
        let res = app
            .clone()
            .oneshot(search_request(serde_json::json!({ "query": "iphone 15 pro" })))
            .await
            .unwrap();
        let body: SearchResponse = read_json(res).await;
        ids.push(body.search_id);
    }
    assert_eq!(ids, [1, 2, 3]);
}

#[tokio::test]
async fn test_health_and_sites() {
    let res = router().oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let health: HealthReport = read_json(res).await;
    assert_eq!(health.status, "healthy");
    assert_eq!(health.services.get("api").map(String::as_str), Some("running"));

    let res = router().oneshot(get("/api/sites")).await.unwrap();
    let sites: SupportedSites = read_json(res).await;
    assert_eq!(sites.total_sites, 3);
    assert!(sites.supported_sites.iter().all(|s| s.status == "active"));
}
