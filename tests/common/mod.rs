// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local stand-in for the hosted Flourse service.
//!
//! Serves on an ephemeral port from a background task and records every
//! request it sees, so tests can count calls and inspect headers.

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get, post},
    Json, Router,
};
use flourse_client::error::{ClientError, Result};
use flourse_client::services::{AuthenticatedHttpClient, AuthenticationSource};
use flourse_client::store::{keys, CredentialStore, MemoryStore};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One request as seen by the mock service.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// Mutable behavior and request log of the mock service.
pub struct MockState {
    /// Token accepted on protected routes (`Bearer <token>`)
    pub accepted_token: Mutex<String>,
    /// Reject every token on protected routes
    pub always_reject: AtomicBool,
    /// Refresh token the `/auth/refresh-token` route accepts
    pub valid_refresh_token: Mutex<String>,
    /// Status and body served by the score table read route
    pub read_response: Mutex<(StatusCode, Value)>,
    /// Status served by the score table delete route
    pub delete_status: Mutex<StatusCode>,
    /// Status served by the score table insert route
    pub insert_status: Mutex<StatusCode>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            accepted_token: Mutex::new("T2".to_string()),
            always_reject: AtomicBool::new(false),
            valid_refresh_token: Mutex::new("R1".to_string()),
            read_response: Mutex::new((StatusCode::OK, json!([]))),
            delete_status: Mutex::new(StatusCode::OK),
            insert_status: Mutex::new(StatusCode::CREATED),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[allow(dead_code)]
impl MockState {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    pub fn set_read_response(&self, status: StatusCode, body: Value) {
        *self.read_response.lock().unwrap() = (status, body);
    }

    fn record(&self, method: Method, uri: &Uri, headers: &HeaderMap, body: String) {
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v: &axum::http::HeaderValue| v.to_str().ok())
                .map(String::from)
        };

        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(String::from),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
            body,
        });
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        if self.always_reject.load(Ordering::SeqCst) {
            return false;
        }
        let expected = format!("Bearer {}", self.accepted_token.lock().unwrap());
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

/// Running mock service.
pub struct MockRemote {
    pub base_url: String,
    pub state: Arc<MockState>,
}

#[allow(dead_code)]
impl MockRemote {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/protected", any(protected))
            .route("/status/{code}", any(fixed_status))
            .route("/auth/login", post(login))
            .route("/auth/signup-direct", post(sign_up))
            .route("/auth/refresh-token", post(refresh_token))
            .route("/auth/verify-token", get(verify_token))
            .route("/database/test_db/read", get(read_scores))
            .route("/database/test_db/delete", any(delete_score))
            .route("/database/test_db/insert", post(insert_scores))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock service");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn protected(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let authorized = state.is_authorized(&headers);
    state.record(method.clone(), &uri, &headers, body);

    if authorized {
        (StatusCode::OK, format!("ok:{}", method))
    } else {
        (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
    }
}

async fn fixed_status(
    State(state): State<Arc<MockState>>,
    Path(code): Path<u16>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, body);
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::IM_A_TEAPOT);
    (status, format!("status:{}", code))
}

async fn login(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, body.clone());
    let creds: Value = serde_json::from_str(&body).unwrap_or_default();

    if creds["password"] == "secret" {
        (
            StatusCode::CREATED,
            Json(json!({
                "accessToken": "T1",
                "refreshToken": "R1",
                "user": { "id": 42, "email": creds["email"], "name": "Ana" }
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
    }
}

async fn sign_up(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    state.record(method, &uri, &headers, body);
    StatusCode::CREATED
}

async fn refresh_token(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.record(method, &uri, &headers, body.clone());
    let request: Value = serde_json::from_str(&body).unwrap_or_default();
    let valid = state.valid_refresh_token.lock().unwrap().clone();

    if request["refreshToken"] == valid.as_str() {
        let token = state.accepted_token.lock().unwrap().clone();
        (StatusCode::OK, Json(json!({ "accessToken": token })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid refresh token" })),
        )
    }
}

async fn verify_token(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> StatusCode {
    let authorized = state.is_authorized(&headers);
    state.record(method, &uri, &headers, String::new());
    if authorized {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn read_scores(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let authorized = state.is_authorized(&headers);
    state.record(method, &uri, &headers, String::new());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "expired" })));
    }
    let (status, body) = state.read_response.lock().unwrap().clone();
    (status, Json(body))
}

async fn delete_score(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> impl IntoResponse {
    let authorized = state.is_authorized(&headers);
    state.record(method, &uri, &headers, String::new());
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "expired" })));
    }
    let status = *state.delete_status.lock().unwrap();
    (status, Json(json!({ "deleted": status.is_success() })))
}

async fn insert_scores(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let authorized = state.is_authorized(&headers);
    state.record(method, &uri, &headers, body);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "expired" })));
    }
    let status = *state.insert_status.lock().unwrap();
    if status.is_success() {
        (status, Json(json!({ "inserted": 1 })))
    } else {
        (status, Json(json!({ "message": "insert rejected" })))
    }
}

/// Authentication source with a scripted outcome.
///
/// On success it writes `new_token` to the store before returning, like the
/// real service does.
#[allow(dead_code)]
pub struct StubAuthSource {
    pub calls: AtomicUsize,
    store: MemoryStore,
    outcome: StubOutcome,
    delay: Duration,
}

#[allow(dead_code)]
pub enum StubOutcome {
    Refreshed(&'static str),
    Rejected,
    Fails,
}

#[allow(dead_code)]
impl StubAuthSource {
    pub fn new(store: &MemoryStore, outcome: StubOutcome) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            store: store.clone(),
            outcome,
            delay: Duration::from_millis(200),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthenticationSource for StubAuthSource {
    async fn refresh_access_token(&self) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Stay in flight long enough for concurrent 401s to pile up.
        tokio::time::sleep(self.delay).await;

        match self.outcome {
            StubOutcome::Refreshed(token) => {
                self.store.store(keys::TOKEN, token).await?;
                Ok(true)
            }
            StubOutcome::Rejected => Ok(false),
            StubOutcome::Fails => Err(ClientError::Internal(anyhow::anyhow!(
                "auth service unreachable"
            ))),
        }
    }
}

/// Client wired to a memory store and the given authentication source.
#[allow(dead_code)]
pub fn test_client(
    store: &MemoryStore,
    auth: Arc<dyn AuthenticationSource>,
) -> AuthenticatedHttpClient {
    AuthenticatedHttpClient::new(reqwest::Client::new(), Arc::new(store.clone()), auth)
}
