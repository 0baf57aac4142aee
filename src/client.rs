use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::data_models::{HealthReport, SearchRequest, SearchResponse, ServiceInfo, SupportedSites};
use crate::error::ClientError;

pub mod paths {
    pub const SEARCH: &str = "api/search/";
    pub const SITES: &str = "api/sites";
    pub const HEALTH: &str = "health";
}

/// The one seam between the search client and the price backend.
pub trait PriceApi {
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchResponse, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        // Url::join drops the last path segment unless it ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(&config.api_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl {
                url: format!("{}{}", self.base_url, path),
                reason: e.to_string(),
            })
    }

    pub async fn service_info(&self) -> Result<ServiceInfo, ClientError> {
        self.get_json("").await
    }

    pub async fn health(&self) -> Result<HealthReport, ClientError> {
        self.get_json(paths::HEALTH).await
    }

    pub async fn sites(&self) -> Result<SupportedSites, ClientError> {
        self.get_json(paths::SITES).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        let res = self.http.get(url).send().await?;
        decode_success(res).await
    }
}

impl PriceApi for HttpClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ClientError> {
        let url = self.endpoint(paths::SEARCH)?;
        log::debug!("POST {url} query={:?}", request.query);
        let res = self.http.post(url).json(request).send().await?;
        decode_success(res).await
    }
}

/// Rejects any non-2xx status before the body is touched.
async fn decode_success<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
    let status = res.status();
    if !status.is_success() {
        log::warn!("backend answered {status} for {}", res.url());
        return Err(ClientError::Status(status));
    }
    let body = res.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[test]
fn test_endpoint_keeps_base_path() {
    let client = HttpClient::new("http://localhost:8000/prefix", Duration::from_secs(1)).unwrap();
    assert_eq!(
        client.endpoint(paths::SEARCH).unwrap().as_str(),
        "http://localhost:8000/prefix/api/search/"
    );

    let client = HttpClient::new("http://localhost:8000", Duration::from_secs(1)).unwrap();
    assert_eq!(
        client.endpoint(paths::HEALTH).unwrap().as_str(),
        "http://localhost:8000/health"
    );
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let err = HttpClient::new("not a url", Duration::from_secs(1)).unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl { .. }));
}
