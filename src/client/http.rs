use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::short_id::normalize_short_id;
use super::trait_def::{ApiError, ApiResult, ShortenerApi};
use crate::config::ApiConfig;
use crate::models::{
    AliasValidation, ErrorBody, ShortenRequest, ShortenResponse, ValidateAliasRequest,
};

/// `ShortenerApi` over HTTP/JSON against a configured base endpoint
#[derive(Clone)]
pub struct HttpShortenerClient {
    base_url: Url,
    client: Client,
}

impl HttpShortenerClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(ApiError::Build)?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // new() only accepts URLs that can be a base
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn read<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|error| error.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string());
            let message = if message.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                message
            };
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ShortenerApi for HttpShortenerClient {
    async fn shorten(&self, request: &ShortenRequest) -> ApiResult<ShortenResponse> {
        let url = self.endpoint(&["shorten"]);
        debug!(%url, original_url = %request.original_url, "requesting short URL");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::read(response).await
    }

    async fn get_stats(&self, short_id: &str) -> ApiResult<ShortenResponse> {
        let id = normalize_short_id(short_id)
            .ok_or_else(|| ApiError::InvalidShortId(short_id.to_string()))?;
        let url = self.endpoint(&["stats", &id]);
        debug!(%url, short_id = %id, "fetching stats");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::read(response).await
    }

    async fn check_alias_availability(&self, alias: &str) -> ApiResult<bool> {
        let url = self.endpoint(&["alias-available", alias]);
        debug!(%url, "checking alias availability");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::read(response).await
    }

    async fn create_custom_url(
        &self,
        original_url: &str,
        custom_alias: &str,
    ) -> ApiResult<ShortenResponse> {
        let url = self.endpoint(&["shorten", "custom"]);
        debug!(%url, %original_url, %custom_alias, "requesting custom short URL");

        let response = self
            .client
            .post(url)
            .json(&ShortenRequest::with_alias(original_url, custom_alias))
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::read(response).await
    }

    async fn validate_custom_alias(&self, alias: &str) -> ApiResult<AliasValidation> {
        let url = self.endpoint(&["validate-alias"]);
        debug!(%url, %alias, "validating alias");

        let response = self
            .client
            .post(url)
            .json(&ValidateAliasRequest {
                alias: alias.to_string(),
            })
            .send()
            .await
            .map_err(ApiError::Transport)?;
        Self::read(response).await
    }
}
