// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight access-token refresh.
//!
//! Every caller that asks for a refresh while one is outstanding attaches to
//! the same pending outcome, so at most one `POST /auth/refresh` is on the
//! wire per coordinator. The call runs on a spawned task, so it finishes even
//! when its callers go away. The pending slot is cleared as soon as that call
//! resolves (or unwinds), and the next caller starts over. A refresh that
//! panics resolves to `false`.

use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::api::endpoints::AUTH_REFRESH;
use crate::api::envelope::{AuthData, Tokens};
use crate::session::{self, CredentialStore};

type PendingRefresh = Shared<BoxFuture<'static, bool>>;

/// Whether a response status should trigger a credential refresh.
pub fn is_unauthorized(status: u16) -> bool {
    status == 401
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<AuthData>,
}

/// Coordinates credential refreshes for one credential store.
///
/// Cloning shares the in-flight state.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    refresh_url: String,
    store: Arc<dyn CredentialStore>,
    secure_cookies: bool,
    pending: Mutex<Option<PendingRefresh>>,
}

/// Clears the pending slot when the refresh body finishes, even by unwinding.
struct ResetPending<'a>(&'a Inner);

impl Drop for ResetPending<'_> {
    fn drop(&mut self) {
        *self.0.pending.lock() = None;
    }
}

impl RefreshCoordinator {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        store: Arc<dyn CredentialStore>,
        secure_cookies: bool,
    ) -> Self {
        let refresh_url = format!("{}{AUTH_REFRESH}", base_url.trim_end_matches('/'));
        Self {
            inner: Arc::new(Inner {
                http,
                refresh_url,
                store,
                secure_cookies,
                pending: Mutex::new(None),
            }),
        }
    }

    /// Refresh the credential pair, or join the refresh already running.
    ///
    /// Returns `true` when fresh credentials were written to the store. Any
    /// failure clears both credentials and returns `false`.
    pub async fn refresh_credentials(&self) -> bool {
        let pending = {
            let mut slot = self.inner.pending.lock();
            match slot.as_ref() {
                Some(pending) => {
                    debug!("token refresh already in progress, waiting");
                    pending.clone()
                }
                None => {
                    // Detached: completes and clears the slot with no callers left.
                    let inner = Arc::clone(&self.inner);
                    let task = tokio::spawn(async move {
                        let _reset = ResetPending(&*inner);
                        inner.refresh().await
                    });
                    let fut = async move {
                        task.await.unwrap_or_else(|e| {
                            error!(err = %e, "token refresh task failed");
                            false
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };
        pending.await
    }

    /// Whether a refresh is currently outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    pub fn secure_cookies(&self) -> bool {
        self.inner.secure_cookies
    }
}

impl Inner {
    async fn refresh(&self) -> bool {
        let Some(refresh_token) = session::refresh_token(self.store.as_ref()) else {
            error!("no refresh token in credential store");
            self.clear();
            return false;
        };

        info!(url = %self.refresh_url, "refreshing access token");
        match self.request_tokens(&refresh_token).await {
            Ok(tokens) => {
                session::update_tokens(self.store.as_ref(), &tokens, self.secure_cookies);
                info!("token refresh succeeded");
                true
            }
            Err(e) => {
                error!(err = %e, "token refresh failed");
                self.clear();
                false
            }
        }
    }

    async fn request_tokens(&self, refresh_token: &str) -> anyhow::Result<Tokens> {
        let resp =
            self.http.post(&self.refresh_url).json(&RefreshRequest { refresh_token }).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("refresh rejected ({status}): {text}");
        }

        let body: RefreshResponse = resp.json().await?;
        if !body.success {
            anyhow::bail!("refresh response reported failure");
        }
        body.data
            .as_ref()
            .and_then(AuthData::tokens)
            .ok_or_else(|| anyhow::anyhow!("refresh response is missing tokens"))
    }

    fn clear(&self) {
        session::delete_session(self.store.as_ref());
        warn!("credentials cleared, re-authentication required");
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
