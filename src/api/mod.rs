use anyhow::{Context, Result};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::catalog::Catalog;

pub mod handlers;
pub mod models;

pub fn create_router(catalog: Arc<Catalog>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/api/sites", get(handlers::sites_handler))
        .route("/api/search/", post(handlers::search_handler))
        .route("/api/search", post(handlers::search_handler))
        .with_state(catalog)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serves the demo backend until the process is stopped.
pub async fn serve(addr: &str, catalog: Arc<Catalog>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("demo backend listening on {}", listener.local_addr()?);
    axum::serve(listener, create_router(catalog))
        .await
        .context("Demo backend stopped unexpectedly")
}
