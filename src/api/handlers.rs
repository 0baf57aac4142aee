use axum::{Json, extract::State, http::StatusCode};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{AI_PROVIDER, Catalog, SITES, VERSION};
use crate::data_models::{
    HealthReport, SearchRequest, SearchResponse, ServiceInfo, SiteStatus, SupportedSites,
};

use super::models::ErrorBody;

pub async fn search_handler(
    State(catalog): State<Arc<Catalog>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorBody>)> {
    if request.query.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Query cannot be empty")),
        ));
    }
    if request.max_results_per_site == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("max_results_per_site must be at least 1")),
        ));
    }

    Ok(Json(catalog.search(&request).await))
}

pub async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "AI-Powered Price Comparison Aggregator".to_string(),
        description: "Product price search across e-commerce sites".to_string(),
        version: VERSION.to_string(),
        ai_provider: AI_PROVIDER.to_string(),
        status: "running".to_string(),
    })
}

pub async fn health_handler() -> Json<HealthReport> {
    let services = BTreeMap::from([
        ("api".to_string(), "running".to_string()),
        ("gemini_ai".to_string(), "configured".to_string()),
    ]);
    Json(HealthReport {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: VERSION.to_string(),
        ai_provider: AI_PROVIDER.to_string(),
        services,
    })
}

pub async fn sites_handler() -> Json<SupportedSites> {
    let supported_sites: Vec<SiteStatus> = SITES
        .iter()
        .map(|site| SiteStatus {
            site: site.to_string(),
            status: "active".to_string(),
        })
        .collect();
    Json(SupportedSites {
        total_sites: supported_sites.len(),
        supported_sites,
        ai_provider: AI_PROVIDER.to_string(),
    })
}
