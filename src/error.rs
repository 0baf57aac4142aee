use reqwest::StatusCode;
use thiserror::Error;

/// Shown for every transport or HTTP level failure, whatever the cause.
pub const BACKEND_UNREACHABLE: &str = "Failed to search products. Check if backend is running.";

/// Shown when the backend reports `failed` without a message of its own.
pub const SEARCH_FAILED: &str = "Search failed";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid backend url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ClientError {
    /// The message surfaced to the user. Failures are not classified further.
    pub fn user_message(&self) -> &'static str {
        BACKEND_UNREACHABLE
    }
}
