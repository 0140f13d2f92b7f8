// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::debug;

use crate::guard::{GuardDecision, RouteGuard};
use crate::session::{self, CookieJar};
use crate::state::GateState;

/// Axum middleware that redirects between protected and auth-only pages.
///
/// Exempt: `/api/*`, static assets and well-known files.
pub async fn guard_layer(
    state: State<Arc<GateState>>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if !RouteGuard::should_run(path) {
        return next.run(req).await;
    }

    let jar = CookieJar::from_headers(req.headers());
    let has_token = session::access_token(&jar).is_some();

    match state.guard.decide(path, has_token) {
        GuardDecision::Next => next.run(req).await,
        GuardDecision::Redirect(location) => {
            debug!(path, has_token, location = %location, "guard redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}
