// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the backend API with transparent token refresh.
//!
//! A 401 on a first attempt triggers [`RefreshCoordinator::refresh_credentials`].
//! On success the request is resent once with `attempt = 1`, which never
//! triggers another refresh. On failure the caller gets a re-authentication
//! error and nothing is resent.

use std::sync::Arc;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::api::envelope::{ApiErrorBody, ApiSuccess};
use crate::error::ApiError;
use crate::redact::redact;
use crate::refresh::{is_unauthorized, RefreshCoordinator};
use crate::session::{self, CredentialStore};

/// Highest attempt number; attempt 0 is the original request.
pub const MAX_ATTEMPT: u8 = 1;

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    /// 0 for the original request, 1 for the resend after a refresh.
    pub attempt: u8,
    /// Whether a 401 may trigger a credential refresh. Off for the auth
    /// endpoints themselves, where 401 means bad credentials.
    pub refresh_on_unauthorized: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
            attempt: 0,
            refresh_on_unauthorized: true,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_unauthorized = false;
        self
    }

    pub fn is_retry(&self) -> bool {
        self.attempt > 0
    }

    fn may_refresh(&self) -> bool {
        self.refresh_on_unauthorized && self.attempt < MAX_ATTEMPT
    }

    fn into_retry(mut self) -> Self {
        self.attempt += 1;
        self
    }
}

/// Backend API client bound to one credential store.
pub struct ApiClient {
    base_url: String,
    http: Client,
    refresh: RefreshCoordinator,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        http: Client,
        store: Arc<dyn CredentialStore>,
        secure_cookies: bool,
    ) -> Self {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let refresh = RefreshCoordinator::new(http.clone(), &base_url, store, secure_cookies);
        Self { base_url, http, refresh }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        self.refresh.store()
    }

    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.refresh
    }

    /// Whether cookies written through this client carry `Secure`.
    pub fn secure_cookies(&self) -> bool {
        self.refresh.secure_cookies()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the success envelope.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<ApiSuccess<T>, ApiError> {
        let path = normalize(endpoint);
        let mut options = options;
        loop {
            let (status, text) = self.send(&path, &options).await?;

            if status.is_success() {
                let body = serde_json::from_str::<ApiSuccess<T>>(&text).map_err(|e| {
                    error!(path = %path, err = %e, "undecodable success response");
                    ApiError::decode(e)
                })?;
                info!(method = %options.method, path = %path, status = status.as_u16(), "api success");
                return Ok(body);
            }

            let body = ApiErrorBody::parse(&text);
            warn!(
                method = %options.method,
                path = %path,
                status = status.as_u16(),
                message = body.message.as_deref().unwrap_or(""),
                "api error"
            );

            if is_unauthorized(status.as_u16()) && options.may_refresh() {
                warn!(path = %path, "unauthorized, attempting token refresh");
                if self.refresh.refresh_credentials().await {
                    info!(path = %path, "token refreshed, retrying request");
                    options = options.into_retry();
                    continue;
                }
                error!(path = %path, "token refresh failed, re-authentication required");
                return Err(ApiError::session_expired());
            }

            return Err(ApiError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                body,
            ));
        }
    }

    async fn send(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<(StatusCode, String), ApiError> {
        let url = self.url(path);
        let is_retry = options.is_retry();
        info!(method = %options.method, path = %path, is_retry, "api request");
        if let Some(ref body) = options.body {
            debug!(body = %redact(body), "api request body");
        }

        let mut req = self
            .http
            .request(options.method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");
        for (name, value) in &options.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(token) = session::access_token(self.store().as_ref()) {
            req = req.bearer_auth(token);
        }
        if let Some(ref body) = options.body {
            req = req.body(body.to_string());
        }

        let resp = req.send().await.map_err(|e| {
            error!(path = %path, err = %e, "network error");
            ApiError::network(e)
        })?;
        let status = resp.status();
        let text = resp.text().await.map_err(ApiError::network)?;
        Ok((status, text))
    }
}

/// Ensure a leading `/`.
fn normalize(endpoint: &str) -> String {
    if endpoint.starts_with('/') {
        endpoint.to_owned()
    } else {
        format!("/{endpoint}")
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
