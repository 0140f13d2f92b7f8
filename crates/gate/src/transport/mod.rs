// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP transport for the gate.

pub mod guard;
pub mod http;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::GateState;

/// Build the axum `Router` with all gate routes.
pub fn build_router(state: Arc<GateState>) -> Router {
    Router::new()
        // Health
        .route("/api/health", get(http::health))
        // Form actions
        .route("/auth/login", post(http::login))
        .route("/auth/register", post(http::register))
        .route("/auth/logout", post(http::logout))
        // Backend passthrough (refresh + retry applied)
        .route("/api/proxy/{*path}", any(http::proxy))
        .fallback(http::not_found)
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), guard::guard_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
