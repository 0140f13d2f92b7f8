// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::GateConfig;
use crate::guard::RouteGuard;
use crate::session::CredentialStore;

/// Shared gate state.
pub struct GateState {
    pub config: GateConfig,
    /// Backend base URL, validated and without a trailing slash.
    pub api_url: String,
    /// Connection pool shared by every per-request [`ApiClient`].
    pub http: reqwest::Client,
    pub guard: RouteGuard,
}

impl GateState {
    pub fn new(config: GateConfig) -> anyhow::Result<Self> {
        crate::install_crypto_provider();
        let api_url = config.api_url()?.to_owned();
        let http = reqwest::Client::builder().timeout(config.request_timeout()).build()?;
        let guard = RouteGuard::new(config.protected_routes.clone(), config.auth_routes.clone());
        Ok(Self { config, api_url, http, guard })
    }

    /// A client bound to one request's credentials. Each client owns its own
    /// refresh coordinator.
    pub fn api_client(&self, store: Arc<dyn CredentialStore>) -> ApiClient {
        ApiClient::new(&self.api_url, self.http.clone(), store, self.config.secure_cookies())
    }

    /// Whether action results carry debug traces.
    pub fn debug_actions(&self) -> bool {
        self.config.is_development()
    }
}
