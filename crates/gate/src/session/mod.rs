// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session credentials: the cookie-backed store the API client and the
//! refresh coordinator read and rewrite.

pub mod jar;

use std::time::Duration;

use crate::api::envelope::Tokens;

pub use jar::{CookieChange, CookieJar};

pub const ACCESS_TOKEN: &str = "accessToken";
pub const REFRESH_TOKEN: &str = "refreshToken";

/// Lifetime of the access cookie set at login.
pub const ACCESS_TOKEN_MAX_AGE: Duration = Duration::from_secs(15 * 60);

/// Lifetime of the refresh cookie set at login.
pub const REFRESH_TOKEN_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Attributes applied when a credential is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    /// `None` leaves expiry to the browser session.
    pub max_age: Option<Duration>,
}

impl CookieOptions {
    /// HttpOnly, `Path=/`, `SameSite=Lax`; `Secure` only when `secure` is set.
    pub fn session(secure: bool) -> Self {
        Self {
            http_only: true,
            secure,
            same_site: SameSite::Lax,
            path: "/".to_owned(),
            max_age: None,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self::session(false)
    }
}

/// Accessor for the credential pair.
///
/// Backing storage and security attributes belong to the implementation;
/// callers only need these three operations.
pub trait CredentialStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str, options: &CookieOptions);
    fn delete(&self, name: &str);
}

/// Store both tokens after login or registration.
pub fn create_session(store: &dyn CredentialStore, tokens: &Tokens, secure: bool) {
    let base = CookieOptions::session(secure);
    store.set(ACCESS_TOKEN, &tokens.access_token, &base.clone().with_max_age(ACCESS_TOKEN_MAX_AGE));
    store.set(REFRESH_TOKEN, &tokens.refresh_token, &base.with_max_age(REFRESH_TOKEN_MAX_AGE));
    tracing::debug!("session created");
}

/// Replace both tokens after a refresh. No max-age, so the backend keeps
/// control of session expiry.
pub fn update_tokens(store: &dyn CredentialStore, tokens: &Tokens, secure: bool) {
    let options = CookieOptions::session(secure);
    store.set(ACCESS_TOKEN, &tokens.access_token, &options);
    store.set(REFRESH_TOKEN, &tokens.refresh_token, &options);
}

/// Drop both tokens.
pub fn delete_session(store: &dyn CredentialStore) {
    store.delete(ACCESS_TOKEN);
    store.delete(REFRESH_TOKEN);
}

pub fn access_token(store: &dyn CredentialStore) -> Option<String> {
    store.get(ACCESS_TOKEN).filter(|t| !t.is_empty())
}

pub fn refresh_token(store: &dyn CredentialStore) -> Option<String> {
    store.get(REFRESH_TOKEN).filter(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
