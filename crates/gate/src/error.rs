// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::envelope::ApiErrorBody;

/// Error codes for the gate's HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Unauthorized,
    SessionExpired,
    BadRequest,
    NotFound,
    UpstreamError,
    Internal,
}

impl ErrorCode {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::SessionExpired => 401,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::UpstreamError => 502,
            Self::Internal => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::UpstreamError => "UPSTREAM_ERROR",
            Self::Internal => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Message surfaced when the refresh credential can no longer be used.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// What went wrong with an outbound API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Backend answered with a non-success status.
    Status,
    /// A 401 could not be recovered by refreshing credentials.
    SessionExpired,
    /// The request never produced a response.
    Network,
    /// A success response carried a body we could not decode.
    Decode,
    /// The request payload could not be serialized.
    Encode,
}

/// Error returned by [`crate::api::client::ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status_code: Option<u16>,
    pub message: String,
    /// Set when the caller must send the user back through login.
    pub requires_reauth: bool,
    pub error_data: Option<ApiErrorBody>,
}

impl ApiError {
    pub fn session_expired() -> Self {
        Self {
            kind: ApiErrorKind::SessionExpired,
            status_code: Some(401),
            message: SESSION_EXPIRED_MESSAGE.to_owned(),
            requires_reauth: true,
            error_data: None,
        }
    }

    /// Build from a failed response. The message prefers the backend's first
    /// `messages` entry, then `message`, then a generic status line.
    pub fn from_status(status: u16, reason: &str, body: ApiErrorBody) -> Self {
        let message = body
            .messages
            .first()
            .filter(|m| !m.is_empty())
            .cloned()
            .or_else(|| body.message.clone().filter(|m| !m.is_empty()))
            .unwrap_or_else(|| format!("API Error: {status} {reason}").trim_end().to_owned());
        Self {
            kind: ApiErrorKind::Status,
            status_code: Some(status),
            message,
            requires_reauth: false,
            error_data: Some(body),
        }
    }

    pub fn network(err: impl fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            status_code: None,
            message: format!("network error: {err}"),
            requires_reauth: false,
            error_data: None,
        }
    }

    pub fn decode(err: impl fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            status_code: None,
            message: format!("invalid response: {err}"),
            requires_reauth: false,
            error_data: None,
        }
    }

    pub fn encode(err: impl fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Encode,
            status_code: None,
            message: format!("invalid request body: {err}"),
            requires_reauth: false,
            error_data: None,
        }
    }

    /// Map onto the gate's HTTP error codes when relaying to a browser.
    pub fn error_code(&self) -> ErrorCode {
        match self.kind {
            ApiErrorKind::SessionExpired => ErrorCode::SessionExpired,
            ApiErrorKind::Network | ApiErrorKind::Decode => ErrorCode::UpstreamError,
            ApiErrorKind::Encode => ErrorCode::BadRequest,
            ApiErrorKind::Status => match self.status_code {
                Some(401) => ErrorCode::Unauthorized,
                Some(404) => ErrorCode::NotFound,
                Some(s) if (400..500).contains(&s) => ErrorCode::BadRequest,
                _ => ErrorCode::UpstreamError,
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
