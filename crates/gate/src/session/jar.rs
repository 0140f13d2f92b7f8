// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-scoped cookie jar.
//!
//! Seeded from an incoming `Cookie` header. Every write is recorded so the
//! response can carry the matching `Set-Cookie` headers. Parsing and
//! rendering go through `axum_extra`'s cookie types, so names and values are
//! percent-encoded on the wire.

use std::collections::HashMap;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, SameSite as CookieSameSite};
use parking_lot::Mutex;

use super::{CookieOptions, CredentialStore, SameSite};

/// A pending cookie mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieChange {
    Set { value: String, options: CookieOptions },
    Delete { path: String },
}

impl CookieChange {
    /// The `Set-Cookie` cookie for this change.
    pub fn to_cookie(&self, name: &str) -> Cookie<'static> {
        match self {
            Self::Set { value, options } => {
                let mut builder = Cookie::build((name.to_owned(), value.clone()))
                    .path(options.path.clone())
                    .http_only(options.http_only)
                    .secure(options.secure)
                    .same_site(options.same_site.into());
                if let Some(max_age) = options.max_age {
                    let secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
                    builder = builder.max_age(time::Duration::seconds(secs));
                }
                builder.build()
            }
            Self::Delete { path } => {
                let mut cookie =
                    Cookie::build((name.to_owned(), "")).path(path.clone()).http_only(true).build();
                cookie.make_removal();
                cookie
            }
        }
    }
}

impl From<SameSite> for CookieSameSite {
    fn from(same_site: SameSite) -> Self {
        match same_site {
            SameSite::Strict => Self::Strict,
            SameSite::Lax => Self::Lax,
            SameSite::None => Self::None,
        }
    }
}

#[derive(Debug, Default)]
struct JarInner {
    values: HashMap<String, String>,
    /// Last change per cookie name, in first-touched order.
    changes: Vec<(String, CookieChange)>,
}

impl JarInner {
    fn record(&mut self, name: &str, change: CookieChange) {
        match self.changes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = change,
            None => self.changes.push((name.to_owned(), change)),
        }
    }

    /// First occurrence of a name wins, matching browser precedence
    /// (most specific path is sent first).
    fn absorb(&mut self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            if let Ok(cookie) = Cookie::parse_encoded(pair.to_owned()) {
                self.values
                    .entry(cookie.name().to_owned())
                    .or_insert_with(|| cookie.value().to_owned());
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct CookieJar {
    inner: Mutex<JarInner>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `Cookie` request header (`a=1; b=2`).
    pub fn from_cookie_header(header: &str) -> Self {
        let mut inner = JarInner::default();
        inner.absorb(header);
        Self { inner: Mutex::new(inner) }
    }

    /// Merge every `Cookie` header of a request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut inner = JarInner::default();
        for value in headers.get_all(COOKIE).iter().filter_map(|v| v.to_str().ok()) {
            inner.absorb(value);
        }
        Self { inner: Mutex::new(inner) }
    }

    /// Mutations made since the jar was created.
    pub fn changes(&self) -> Vec<(String, CookieChange)> {
        self.inner.lock().changes.clone()
    }

    /// `Set-Cookie` header values for every recorded mutation.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.inner
            .lock()
            .changes
            .iter()
            .map(|(name, change)| change.to_cookie(name).encoded().to_string())
            .collect()
    }
}

impl CredentialStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.inner.lock().values.get(name).cloned()
    }

    fn set(&self, name: &str, value: &str, options: &CookieOptions) {
        let mut inner = self.inner.lock();
        inner.values.insert(name.to_owned(), value.to_owned());
        inner.record(
            name,
            CookieChange::Set { value: value.to_owned(), options: options.clone() },
        );
    }

    fn delete(&self, name: &str) {
        let mut inner = self.inner.lock();
        inner.values.remove(name);
        inner.record(name, CookieChange::Delete { path: "/".to_owned() });
    }
}

#[cfg(test)]
#[path = "jar_tests.rs"]
mod tests;
