// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authgate: session-aware front server for a token-authenticated backend.

pub mod action;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod redact;
pub mod refresh;
pub mod session;
pub mod state;
pub mod test_support;
pub mod transport;
pub mod validation;

use std::sync::{Arc, Once};

use tokio::net::TcpListener;

use crate::config::GateConfig;
use crate::state::GateState;
use crate::transport::build_router;

/// Install the process-wide rustls crypto provider. Safe to call repeatedly.
pub fn install_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        // Err means another provider is already installed; that one is used.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Run the gate server until ctrl-c.
pub async fn run(config: GateConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(GateState::new(config)?);

    tracing::info!(
        api_url = %state.api_url,
        environment = %state.config.environment,
        "authgate listening on {addr}"
    );

    let router = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("authgate stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}
