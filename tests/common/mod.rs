//! Shared test doubles: a recording `ShortenerApi` and an in-process HTTP backend.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use stellar::client::{ApiError, ApiResult, ShortenerApi};
use stellar::models::{AliasValidation, ShortenRequest, ShortenResponse};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Shorten(ShortenRequest),
    GetStats(String),
    CheckAlias(String),
    CreateCustom { original_url: String, alias: String },
    ValidateAlias(String),
}

/// Scripted `ShortenerApi` that records every call it receives
pub struct MockApi {
    calls: Mutex<Vec<ApiCall>>,
    short_urls: Mutex<HashMap<String, String>>,
    default_short_url: String,
    click_count: u64,
    fail_shorten: bool,
    fail_stats: bool,
    panic_shorten: bool,
    panic_stats: bool,
    clicks_per_call: bool,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    stats_gates: Mutex<HashMap<usize, Arc<Notify>>>,
}

impl MockApi {
    pub fn returning(short_url: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            short_urls: Mutex::new(HashMap::new()),
            default_short_url: short_url.to_string(),
            click_count: 0,
            fail_shorten: false,
            fail_stats: false,
            panic_shorten: false,
            panic_stats: false,
            clicks_per_call: false,
            gates: Mutex::new(HashMap::new()),
            stats_gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_click_count(mut self, click_count: u64) -> Self {
        self.click_count = click_count;
        self
    }

    pub fn failing_shorten(mut self) -> Self {
        self.fail_shorten = true;
        self
    }

    pub fn failing_stats(mut self) -> Self {
        self.fail_stats = true;
        self
    }

    pub fn panicking_shorten(mut self) -> Self {
        self.panic_shorten = true;
        self
    }

    pub fn panicking_stats(mut self) -> Self {
        self.panic_stats = true;
        self
    }

    /// The n-th stats call (1-based) reports n clicks
    pub fn clicks_per_call(mut self) -> Self {
        self.clicks_per_call = true;
        self
    }

    /// Answer shorten requests for `original_url` with a specific short URL
    pub fn map(self, original_url: &str, short_url: &str) -> Self {
        self.short_urls
            .lock()
            .unwrap()
            .insert(original_url.to_string(), short_url.to_string());
        self
    }

    /// Hold shorten requests for `original_url` until the returned handle is notified
    pub fn gate(&self, original_url: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(original_url.to_string(), Arc::clone(&notify));
        notify
    }

    /// Hold the n-th stats call (1-based) until the returned handle is notified
    pub fn stats_gate(&self, call: usize) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.stats_gates
            .lock()
            .unwrap()
            .insert(call, Arc::clone(&notify));
        notify
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shorten_calls(&self) -> Vec<ShortenRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::Shorten(request) => Some(request),
                ApiCall::CreateCustom {
                    original_url,
                    alias,
                } => Some(ShortenRequest::with_alias(original_url, alias)),
                _ => None,
            })
            .collect()
    }

    pub fn stats_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::GetStats(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn wait_for_gate(&self, original_url: &str) {
        let gate = self.gates.lock().unwrap().get(original_url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn response_for(&self, original_url: &str, custom_alias: Option<&str>) -> ShortenResponse {
        let short_url = match custom_alias {
            Some(alias) => format!("https://svc/{alias}"),
            None => self
                .short_urls
                .lock()
                .unwrap()
                .get(original_url)
                .cloned()
                .unwrap_or_else(|| self.default_short_url.clone()),
        };
        ShortenResponse {
            original_url: original_url.to_string(),
            short_url,
            created_at: Utc::now(),
            click_count: 0,
            custom_alias: custom_alias.map(str::to_string),
        }
    }

    fn rejection() -> ApiError {
        ApiError::Rejected {
            status: 500,
            message: "Error creating short URL".to_string(),
        }
    }
}

#[async_trait]
impl ShortenerApi for MockApi {
    async fn shorten(&self, request: &ShortenRequest) -> ApiResult<ShortenResponse> {
        self.record(ApiCall::Shorten(request.clone()));
        self.wait_for_gate(&request.original_url).await;
        if self.panic_shorten {
            panic!("shorten blew up");
        }
        if self.fail_shorten {
            return Err(Self::rejection());
        }
        Ok(self.response_for(&request.original_url, request.custom_alias.as_deref()))
    }

    async fn get_stats(&self, short_id: &str) -> ApiResult<ShortenResponse> {
        self.record(ApiCall::GetStats(short_id.to_string()));
        let call = self.stats_calls().len();
        let gate = self.stats_gates.lock().unwrap().get(&call).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.panic_stats {
            panic!("stats blew up");
        }
        if self.fail_stats {
            return Err(ApiError::Rejected {
                status: 404,
                message: "URL not found".to_string(),
            });
        }
        let mut response = self.response_for("https://example.com", None);
        response.short_url = short_id.to_string();
        response.click_count = if self.clicks_per_call {
            call as u64
        } else {
            self.click_count
        };
        Ok(response)
    }

    async fn check_alias_availability(&self, alias: &str) -> ApiResult<bool> {
        self.record(ApiCall::CheckAlias(alias.to_string()));
        Ok(alias != "taken")
    }

    async fn create_custom_url(
        &self,
        original_url: &str,
        custom_alias: &str,
    ) -> ApiResult<ShortenResponse> {
        self.record(ApiCall::CreateCustom {
            original_url: original_url.to_string(),
            alias: custom_alias.to_string(),
        });
        self.wait_for_gate(original_url).await;
        if self.fail_shorten {
            return Err(Self::rejection());
        }
        Ok(self.response_for(original_url, Some(custom_alias)))
    }

    async fn validate_custom_alias(&self, alias: &str) -> ApiResult<AliasValidation> {
        self.record(ApiCall::ValidateAlias(alias.to_string()));
        Ok(AliasValidation {
            valid: true,
            message: None,
        })
    }
}

/// A request as seen by the mock backend
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct BackendState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    short_base: Arc<Mutex<String>>,
}

impl BackendState {
    fn record(
        &self,
        method: &'static str,
        path: String,
        headers: &HeaderMap,
        body: Option<Value>,
    ) {
        let header_value = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path,
            accept: header_value(header::ACCEPT),
            content_type: header_value(header::CONTENT_TYPE),
            body,
        });
    }

    fn short_url(&self, id: &str) -> String {
        format!("{}/{}", self.short_base.lock().unwrap(), id)
    }
}

/// In-process stand-in for the remote shortener service
pub struct MockBackend {
    pub addr: SocketAddr,
    state: BackendState,
}

impl MockBackend {
    /// Base URL the client should be configured with
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

fn error_body(status: StatusCode, message: &str, path: &str) -> Response {
    (
        status,
        Json(json!({
            "timestamp": "2024-05-01T10:15:30.123456",
            "message": message,
            "path": path,
        })),
    )
        .into_response()
}

fn url_document(state: &BackendState, original_url: &str, id: &str, clicks: u64) -> Value {
    json!({
        "originalUrl": original_url,
        "shortUrl": state.short_url(id),
        "createdAt": "2024-05-01T10:15:30.123456",
        "clickCount": clicks,
    })
}

async fn shorten(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("POST", "/api/shorten".to_string(), &headers, Some(body.clone()));

    let url = body["url"].as_str().unwrap_or_default();
    if url == "https://reject.example" {
        return error_body(StatusCode::BAD_REQUEST, "Invalid URL format", "/api/shorten");
    }

    Json(url_document(&state, url, "abc123", 0)).into_response()
}

async fn shorten_custom(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(
        "POST",
        "/api/shorten/custom".to_string(),
        &headers,
        Some(body.clone()),
    );

    let url = body["url"].as_str().unwrap_or_default();
    let alias = body["customAlias"].as_str().unwrap_or_default();
    if alias == "taken" {
        return error_body(
            StatusCode::CONFLICT,
            "Custom alias already in use",
            "/api/shorten/custom",
        );
    }

    let mut document = url_document(&state, url, alias, 0);
    document["customAlias"] = json!(alias);
    Json(document).into_response()
}

async fn stats(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Path(short_id): Path<String>,
) -> Response {
    state.record("GET", format!("/api/stats/{short_id}"), &headers, None);

    match short_id.as_str() {
        "missing" => error_body(
            StatusCode::NOT_FOUND,
            "URL not found with shortId: missing",
            "/api/stats/missing",
        ),
        "garbled" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        "plain-error" => (StatusCode::SERVICE_UNAVAILABLE, "try later").into_response(),
        _ => Json(url_document(&state, "https://example.com/very/long/path", &short_id, 7))
            .into_response(),
    }
}

async fn alias_available(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Path(alias): Path<String>,
) -> Response {
    state.record("GET", format!("/api/alias-available/{alias}"), &headers, None);
    Json(alias != "taken").into_response()
}

async fn validate_alias(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(
        "POST",
        "/api/validate-alias".to_string(),
        &headers,
        Some(body.clone()),
    );

    let alias = body["alias"].as_str().unwrap_or_default();
    let well_formed = alias.len() >= 4
        && alias
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if well_formed {
        Json(json!({ "valid": true })).into_response()
    } else {
        Json(json!({
            "valid": false,
            "message": "Custom alias must be at least 4 characters long and can only contain letters, numbers, hyphens, and underscores",
        }))
        .into_response()
    }
}

/// Start the mock backend on an ephemeral local port
pub async fn spawn_backend() -> MockBackend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = BackendState::default();
    *state.short_base.lock().unwrap() = format!("http://{addr}");

    let api = Router::new()
        .route("/shorten", post(shorten))
        .route("/shorten/custom", post(shorten_custom))
        .route("/stats/{short_id}", get(stats))
        .route("/alias-available/{alias}", get(alias_available))
        .route("/validate-alias", post(validate_alias))
        .with_state(state.clone());
    let app = Router::new().nest("/api", api);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend { addr, state }
}

/// A local address with nothing listening on it
pub async fn closed_port_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}
