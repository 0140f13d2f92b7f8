// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path-based route protection.
//!
//! Protected prefixes need an access token; auth prefixes (login, register)
//! are only for signed-out visitors. Everything else passes through.

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/dashboard";

/// Paths the guard never inspects: API traffic, static assets, well-known files.
const SKIP_PREFIXES: &[&str] = &["/api", "/_next/static", "/_next/image"];
const SKIP_EXACT: &[&str] = &["/favicon.ico", "/sitemap.xml", "/robots.txt"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Next,
    /// Redirect to this location.
    Redirect(String),
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected: Vec<String>,
    auth_routes: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(
            vec![HOME_PATH.to_owned()],
            vec![LOGIN_PATH.to_owned(), "/register".to_owned(), "/forgot-password".to_owned()],
        )
    }
}

impl RouteGuard {
    pub fn new(protected: Vec<String>, auth_routes: Vec<String>) -> Self {
        Self { protected, auth_routes }
    }

    /// Whether the guard applies to `path` at all.
    pub fn should_run(path: &str) -> bool {
        !SKIP_EXACT.contains(&path) && !SKIP_PREFIXES.iter().any(|p| path.starts_with(p))
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn is_auth_route(&self, path: &str) -> bool {
        self.auth_routes.iter().any(|p| path.starts_with(p.as_str()))
    }

    pub fn decide(&self, path: &str, has_token: bool) -> GuardDecision {
        if self.is_protected(path) && !has_token {
            return GuardDecision::Redirect(format!(
                "{LOGIN_PATH}?callbackUrl={}",
                crate::api::query::encode(path)
            ));
        }
        if self.is_auth_route(path) && has_token {
            return GuardDecision::Redirect(HOME_PATH.to_owned());
        }
        GuardDecision::Next
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
