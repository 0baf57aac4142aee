use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::{Router, routing::post};
use tokio::net::TcpListener;

use pricefind::api::create_router;
use pricefind::catalog::Catalog;
use pricefind::client::{HttpClient, PriceApi};
use pricefind::data_models::{SearchRequest, SearchStatus};
use pricefind::error::{BACKEND_UNREACHABLE, ClientError};
use pricefind::search_client::{SearchClient, SearchSettings, SearchState};

mod test_helpers {
    use super::*;

    /// Serves `app` on an ephemeral port for the rest of the test.
    pub async fn spawn(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    pub async fn demo_backend() -> SocketAddr {
        spawn(create_router(Arc::new(Catalog::new(Duration::ZERO)))).await
    }

    pub fn http_client(addr: SocketAddr) -> HttpClient {
        HttpClient::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
    }

    pub fn request(query: &str) -> SearchRequest {
        SearchRequest::new(query, 3, true)
    }

    /// A body that would decode fine, served with an error status.
    pub const VALID_BODY: &str = r#"{"search_id":1,"query":"x","status":"completed",
        "results":[{"id":1,"site":"amazon.com","product_name":"X","extracted_at":"2024-01-01T00:00:00"}],
        "total_found":1,"sites_searched":[]}"#;
}

use test_helpers::*;

#[tokio::test]
async fn test_end_to_end_search() {
    let addr = demo_backend().await;
    let mut client = SearchClient::new(
        http_client(addr),
        SearchSettings::default(),
        Duration::from_secs(4),
    );
    client.set_query("  sony wh-1000xm5 ");
    assert!(client.search().await);

    let response = match client.state() {
        SearchState::Completed(response) => response,
        other => panic!("unexpected state {other:?}"),
    };
    assert_eq!(response.query, "sony wh-1000xm5");
    assert_eq!(response.total_found, 6);
    let message = &client.notifications().active()[0].message;
    assert_eq!(
        message,
        &format!(
            "Found 6 products in {}ms",
            response.search_time_ms.unwrap()
        )
    );
}

#[tokio::test]
async fn test_health_sites_and_info() {
    let addr = demo_backend().await;
    let client = http_client(addr);

    assert_eq!(client.health().await.unwrap().status, "healthy");
    assert_eq!(client.sites().await.unwrap().total_sites, 3);
    assert_eq!(client.service_info().await.unwrap().status, "running");
}

#[tokio::test]
async fn test_error_status_is_not_decoded() {
    let app = Router::new().route(
        "/api/search/",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, VALID_BODY) }),
    );
    let addr = spawn(app).await;

    let err = http_client(addr).search(&request("x")).await.unwrap_err();
    assert!(matches!(err, ClientError::Status(s) if s == StatusCode::INTERNAL_SERVER_ERROR));

    let mut client = SearchClient::new(
        http_client(addr),
        SearchSettings::default(),
        Duration::from_secs(4),
    );
    client.set_query("x");
    client.search().await;
    assert!(client.current_response().is_none());
    assert_eq!(
        client.state(),
        &SearchState::Failed {
            response: None,
            message: BACKEND_UNREACHABLE.to_string(),
        }
    );
}

#[tokio::test]
async fn test_success_status_with_valid_body_decodes() {
    let app = Router::new().route("/api/search/", post(|| async { VALID_BODY }));
    let addr = spawn(app).await;

    let response = http_client(addr).search(&request("x")).await.unwrap();
    assert_eq!(response.status, SearchStatus::Completed);
    assert_eq!(response.results[0].currency, "USD");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let app = Router::new().route("/api/search/", post(|| async { "<html>oops</html>" }));
    let addr = spawn(app).await;

    let err = http_client(addr).search(&request("x")).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // grab a free port, then close it
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let err = http_client(addr).search(&request("x")).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.user_message(), BACKEND_UNREACHABLE);
}
