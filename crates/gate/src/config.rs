// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Deployment environment. Controls cookie security and debug traces.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Production,
    Test,
}

impl std::fmt::Display for AppEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
            Self::Test => f.write_str("test"),
        }
    }
}

impl std::str::FromStr for AppEnv {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => anyhow::bail!("invalid environment: {other}"),
        }
    }
}

/// Session-aware front server for a token-authenticated backend API.
#[derive(Debug, Clone, Parser)]
#[command(name = "authgate", version, about)]
pub struct GateConfig {
    /// Host address to bind to.
    #[arg(long, env = "AUTHGATE_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// HTTP port to listen on.
    #[arg(long, env = "AUTHGATE_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Base URL of the backend API (e.g. `https://api.example.com/api/v1`).
    #[arg(long, env = "AUTHGATE_API_URL")]
    pub api_url: Option<String>,

    /// Deployment environment (development, production, test).
    #[arg(long, env = "AUTHGATE_ENV", default_value = "development")]
    pub environment: String,

    /// Per-request timeout for backend calls, in milliseconds.
    #[arg(long, env = "AUTHGATE_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Path prefixes that require a session.
    #[arg(
        long,
        env = "AUTHGATE_PROTECTED_ROUTES",
        value_delimiter = ',',
        default_value = "/dashboard"
    )]
    pub protected_routes: Vec<String>,

    /// Path prefixes only shown to signed-out visitors.
    #[arg(
        long,
        env = "AUTHGATE_AUTH_ROUTES",
        value_delimiter = ',',
        default_value = "/login,/register,/forgot-password"
    )]
    pub auth_routes: Vec<String>,

    /// Log format (json or text).
    #[arg(long, env = "AUTHGATE_LOG_FORMAT", default_value = "json")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "AUTHGATE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl GateConfig {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        let api_url = self.api_url()?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            anyhow::bail!("--api-url must be an http(s) URL, got: {api_url}");
        }

        self.env()?;

        if self.request_timeout_ms == 0 {
            anyhow::bail!("--request-timeout-ms must be greater than zero");
        }

        for route in self.protected_routes.iter().chain(&self.auth_routes) {
            if !route.starts_with('/') {
                anyhow::bail!("route prefix must start with '/': {route}");
            }
        }

        match self.log_format.as_str() {
            "json" | "text" => Ok(()),
            other => anyhow::bail!("invalid log format: {other}"),
        }
    }

    pub fn api_url(&self) -> anyhow::Result<&str> {
        match self.api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url.trim_end_matches('/')),
            _ => anyhow::bail!("missing required --api-url (AUTHGATE_API_URL)"),
        }
    }

    pub fn env(&self) -> anyhow::Result<AppEnv> {
        self.environment.parse()
    }

    /// Cookies carry `Secure` only in production.
    pub fn secure_cookies(&self) -> bool {
        matches!(self.env(), Ok(AppEnv::Production))
    }

    /// Actions attach debug traces only in development.
    pub fn is_development(&self) -> bool {
        matches!(self.env(), Ok(AppEnv::Development))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Build a config for tests pointed at `api_url`.
    #[doc(hidden)]
    pub fn test(api_url: &str) -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            api_url: Some(api_url.to_owned()),
            environment: "test".into(),
            request_timeout_ms: 5_000,
            protected_routes: vec!["/dashboard".into()],
            auth_routes: vec!["/login".into(), "/register".into(), "/forgot-password".into()],
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
