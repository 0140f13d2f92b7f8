// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: an in-process mock of the backend API.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::api::endpoints::{AUTH_LOGIN, AUTH_LOGOUT, AUTH_REFRESH, AUTH_REGISTER};
use crate::api::envelope::Tokens;

/// Password the mock backend accepts at login.
pub const MOCK_PASSWORD: &str = "password123";

/// Email the mock backend reports as already registered.
pub const TAKEN_EMAIL: &str = "taken@example.com";

struct TokenState {
    generation: u32,
    access: String,
    refresh: String,
}

impl TokenState {
    fn rotate(&mut self) -> Tokens {
        self.generation += 1;
        self.access = format!("access-{}", self.generation);
        self.refresh = format!("refresh-{}", self.generation);
        self.pair()
    }

    fn pair(&self) -> Tokens {
        Tokens { access_token: self.access.clone(), refresh_token: self.refresh.clone() }
    }
}

struct MockState {
    tokens: Mutex<TokenState>,
    refresh_delay: Duration,
    refresh_override: Option<(u16, String)>,
    refresh_calls: AtomicU32,
    api_calls: AtomicU32,
    logout_calls: AtomicU32,
}

/// Builder for [`MockBackend`].
#[derive(Default)]
pub struct MockBackendBuilder {
    refresh_delay: Duration,
    refresh_override: Option<(u16, String)>,
}

impl MockBackendBuilder {
    /// Hold every refresh response for `delay` before answering.
    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    /// Answer every refresh with a fixed status and raw body.
    pub fn refresh_response(mut self, status: u16, body: impl Into<String>) -> Self {
        self.refresh_override = Some((status, body.into()));
        self
    }

    pub async fn start(self) -> anyhow::Result<MockBackend> {
        let state = Arc::new(MockState {
            tokens: Mutex::new(TokenState {
                generation: 0,
                access: "access-0".to_owned(),
                refresh: "refresh-0".to_owned(),
            }),
            refresh_delay: self.refresh_delay,
            refresh_override: self.refresh_override,
            refresh_calls: AtomicU32::new(0),
            api_calls: AtomicU32::new(0),
            logout_calls: AtomicU32::new(0),
        });

        let app = Router::new()
            .route(AUTH_REFRESH, post(refresh))
            .route(AUTH_LOGIN, post(login))
            .route(AUTH_REGISTER, post(register))
            .route(AUTH_LOGOUT, post(logout))
            .fallback(resource)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(MockBackend { addr, state })
    }
}

/// A running mock backend.
///
/// Issues `access-N`/`refresh-N` pairs, starting from `access-0`/`refresh-0`.
/// Only the latest access token is accepted on resource routes; every other
/// path echoes the request back inside a success envelope.
pub struct MockBackend {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockBackend {
    pub fn builder() -> MockBackendBuilder {
        MockBackendBuilder::default()
    }

    pub async fn start() -> anyhow::Result<Self> {
        Self::builder().start().await
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The pair the backend currently accepts.
    pub fn current_tokens(&self) -> Tokens {
        self.state.tokens.lock().pair()
    }

    pub fn refresh_calls(&self) -> u32 {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn api_calls(&self) -> u32 {
        self.state.api_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> u32 {
        self.state.logout_calls.load(Ordering::SeqCst)
    }
}

/// A reqwest client usable against the mock.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    crate::install_crypto_provider();
    Ok(reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?)
}

fn error_envelope(status: u16, path: &str, message: &str) -> Response {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({
        "statusCode": status,
        "timestamp": "2026-01-01T00:00:00.000Z",
        "path": path,
        "error": code.canonical_reason().unwrap_or("Error"),
        "message": message,
        "messages": [message],
        "data": {},
    });
    (code, Json(body)).into_response()
}

fn auth_envelope(status: u16, tokens: &Tokens, email: &str) -> Response {
    let code = StatusCode::from_u16(status).unwrap_or(StatusCode::OK);
    let body = json!({
        "success": true,
        "statusCode": status,
        "message": "ok",
        "data": {
            "user": { "id": 1, "email": email, "fullName": "Test User", "role": "user" },
            "accessToken": tokens.access_token,
            "refreshToken": tokens.refresh_token,
            "refreshExpiresIn": 604800,
        },
    });
    (code, Json(body)).into_response()
}

async fn refresh(State(s): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    s.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if !s.refresh_delay.is_zero() {
        tokio::time::sleep(s.refresh_delay).await;
    }
    if let Some((status, raw)) = s.refresh_override.clone() {
        let code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (code, raw).into_response();
    }

    let presented = body["refreshToken"].as_str().unwrap_or_default();
    let tokens = {
        let mut state = s.tokens.lock();
        if presented != state.refresh {
            None
        } else {
            Some(state.rotate())
        }
    };
    match tokens {
        Some(tokens) => auth_envelope(200, &tokens, "user@example.com"),
        None => error_envelope(401, AUTH_REFRESH, "Invalid refresh token"),
    }
}

async fn login(State(s): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    if body["password"].as_str() != Some(MOCK_PASSWORD) {
        return error_envelope(401, AUTH_LOGIN, "Invalid credentials");
    }
    let tokens = s.tokens.lock().rotate();
    auth_envelope(200, &tokens, &email)
}

async fn register(State(s): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    if email == TAKEN_EMAIL {
        return error_envelope(409, AUTH_REGISTER, "Email already registered");
    }
    let tokens = s.tokens.lock().rotate();
    auth_envelope(201, &tokens, &email)
}

async fn logout(State(s): State<Arc<MockState>>) -> Response {
    s.logout_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "success": true, "statusCode": 200, "message": "Logged out", "data": null }))
        .into_response()
}

async fn resource(
    State(s): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    s.api_calls.fetch_add(1, Ordering::SeqCst);
    let path = uri.path().to_owned();

    let expected = format!("Bearer {}", s.tokens.lock().access);
    let presented = headers.get("authorization").and_then(|v| v.to_str().ok()).unwrap_or("");
    if presented != expected {
        return error_envelope(401, &path, "Unauthorized");
    }

    match path.as_str() {
        "/boom" => return error_envelope(500, &path, "Something broke"),
        "/plain-error" => return (StatusCode::BAD_REQUEST, "bad thing").into_response(),
        "/not-json" => return (StatusCode::OK, "<html></html>").into_response(),
        _ => {}
    }

    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    Json(json!({
        "success": true,
        "statusCode": 200,
        "message": "ok",
        "data": {
            "method": method.as_str(),
            "path": path,
            "query": uri.query().unwrap_or(""),
            "requestId": headers.get("x-request-id").and_then(|v| v.to_str().ok()),
            "body": body,
        },
    }))
    .into_response()
}
