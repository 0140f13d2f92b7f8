// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the gate.
//!
//! Each request gets its own [`CookieJar`] and [`ApiClient`](crate::api::ApiClient),
//! so refresh single-flight is scoped to one browser request. Cookie changes
//! made while handling the request are returned as `Set-Cookie` headers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::envelope::ApiSuccess;
use crate::api::RequestOptions;
use crate::auth;
use crate::error::{ApiErrorKind, ErrorCode};
use crate::session::CookieJar;
use crate::state::GateState;
use crate::validation::FormData;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Attach the jar's pending cookie changes to `resp`.
fn with_cookies(jar: &CookieJar, resp: impl IntoResponse) -> Response {
    let mut resp = resp.into_response();
    for cookie in jar.set_cookie_headers() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                resp.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => warn!(err = %e, "dropping unencodable cookie"),
        }
    }
    resp
}

fn request_jar(headers: &HeaderMap) -> Arc<CookieJar> {
    Arc::new(CookieJar::from_headers(headers))
}

/// `GET /api/health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "running".to_owned() })
}

/// `POST /auth/login`
pub async fn login(
    State(s): State<Arc<GateState>>,
    headers: HeaderMap,
    Form(form): Form<FormData>,
) -> Response {
    let jar = request_jar(&headers);
    let client = s.api_client(jar.clone());
    let state = auth::login(&client, &form, s.debug_actions()).await;
    with_cookies(&jar, Json(state))
}

/// `POST /auth/register`
pub async fn register(
    State(s): State<Arc<GateState>>,
    headers: HeaderMap,
    Form(form): Form<FormData>,
) -> Response {
    let jar = request_jar(&headers);
    let client = s.api_client(jar.clone());
    let state = auth::register(&client, &form, s.debug_actions()).await;
    with_cookies(&jar, Json(state))
}

/// `POST /auth/logout`
pub async fn logout(State(s): State<Arc<GateState>>, headers: HeaderMap) -> Response {
    let jar = request_jar(&headers);
    let client = s.api_client(jar.clone());
    auth::logout(&client).await;
    with_cookies(&jar, Json(LogoutResponse { success: true }))
}

/// `ANY /api/proxy/{*path}`: forward to the backend with the caller's session.
pub async fn proxy(
    State(s): State<Arc<GateState>>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut options = RequestOptions::new(method);
    if !body.is_empty() {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => options = options.with_body(value),
            Err(e) => {
                return ErrorCode::BadRequest
                    .to_http_response(format!("invalid JSON body: {e}"))
                    .into_response();
            }
        }
    }

    let endpoint = match query {
        Some(q) if !q.is_empty() => format!("/{path}?{q}"),
        _ => format!("/{path}"),
    };

    let jar = request_jar(&headers);
    let client = s.api_client(jar.clone());
    let result = client.request::<Value>(&endpoint, options).await;

    let resp = match result {
        Ok(envelope) => success_response(envelope),
        Err(e) => {
            let code = e.error_code();
            info!(
                endpoint = %endpoint,
                code = %code,
                requires_reauth = e.requires_reauth,
                "proxy request failed"
            );
            match (e.kind, e.status_code, e.error_data) {
                // Relay the backend's own error envelope untouched.
                (ApiErrorKind::Status, Some(status), Some(body)) => {
                    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                    (status, Json(body)).into_response()
                }
                _ => code.to_http_response(e.message).into_response(),
            }
        }
    };
    with_cookies(&jar, resp)
}

fn success_response(envelope: ApiSuccess<Value>) -> Response {
    let status = StatusCode::from_u16(envelope.status_code)
        .ok()
        .filter(StatusCode::is_success)
        .unwrap_or(StatusCode::OK);
    (status, Json(envelope)).into_response()
}

/// Anything unrouted that made it past the guard.
pub async fn not_found() -> Response {
    ErrorCode::NotFound.to_http_response("not found").into_response()
}
