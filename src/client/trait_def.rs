use crate::models::{AliasValidation, ShortenRequest, ShortenResponse};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// No response was received
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("'{0}' does not contain a short identifier")]
    InvalidShortId(String),
    #[error("invalid API base URL '{0}'")]
    InvalidBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    /// The task running the call panicked or was cancelled before resolving
    #[error("call did not complete: {0}")]
    Interrupted(#[source] tokio::task::JoinError),
}

impl ApiError {
    /// Status code of a remote rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Remote operations of the shortening service.
///
/// Every call makes at most one outbound request and never retries.
#[async_trait]
pub trait ShortenerApi: Send + Sync {
    /// Create a short URL, optionally with a custom alias
    async fn shorten(&self, request: &ShortenRequest) -> ApiResult<ShortenResponse>;

    /// Fetch current metadata (including the click count).
    ///
    /// Accepts a bare identifier or a full short URL.
    async fn get_stats(&self, short_id: &str) -> ApiResult<ShortenResponse>;

    /// Whether a custom alias is still free
    async fn check_alias_availability(&self, alias: &str) -> ApiResult<bool>;

    /// Create a short URL under a mandatory custom alias
    async fn create_custom_url(
        &self,
        original_url: &str,
        custom_alias: &str,
    ) -> ApiResult<ShortenResponse>;

    /// Check an alias against the service rules before submitting it
    async fn validate_custom_alias(&self, alias: &str) -> ApiResult<AliasValidation>;
}
