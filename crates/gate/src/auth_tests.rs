// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use super::*;
use crate::action::{ToastKind, INVALID_INPUT_MESSAGE};
use crate::session::{CookieChange, CookieJar, CredentialStore, ACCESS_TOKEN, REFRESH_TOKEN};
use crate::test_support::{http_client, MockBackend, MOCK_PASSWORD, TAKEN_EMAIL};
use crate::validation::PASSWORDS_DIFFER;

fn client_with(backend: &MockBackend, cookies: &str) -> anyhow::Result<(ApiClient, Arc<CookieJar>)> {
    let jar = Arc::new(CookieJar::from_cookie_header(cookies));
    let store: Arc<dyn CredentialStore> = jar.clone();
    Ok((ApiClient::new(&backend.base_url(), http_client()?, store, false), jar))
}

fn form(pairs: &[(&str, &str)]) -> FormData {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[tokio::test]
async fn login_creates_session() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, jar) = client_with(&backend, "")?;

    let state = login(
        &client,
        &form(&[("email", "user@example.com"), ("password", MOCK_PASSWORD)]),
        false,
    )
    .await;

    assert!(state.success, "{:?}", state.message);
    assert_eq!(state.redirect_to.as_deref(), Some(HOME_PATH));
    let toast = state.toast.as_ref().map(|t| (t.kind, t.message.as_str()));
    assert_eq!(toast, Some((ToastKind::Success, LOGIN_SUCCESS_MESSAGE)));
    let user = state.data.flatten().unwrap_or_default();
    assert_eq!(user.email, "user@example.com");

    let issued = backend.current_tokens();
    assert_eq!(jar.get(ACCESS_TOKEN), Some(issued.access_token));
    assert_eq!(jar.get(REFRESH_TOKEN), Some(issued.refresh_token));
    let headers = jar.set_cookie_headers();
    assert!(headers.iter().any(|h| h.starts_with("accessToken=access-1;") && h.contains("Max-Age=900")));
    assert!(headers.iter().any(|h| h.starts_with("refreshToken=refresh-1;") && h.contains("Max-Age=604800")));
    Ok(())
}

#[tokio::test]
async fn login_with_bad_password_keeps_existing_session() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, jar) = client_with(&backend, "accessToken=access-0; refreshToken=refresh-0")?;

    let state =
        login(&client, &form(&[("email", "user@example.com"), ("password", "nope")]), false).await;

    assert!(!state.success);
    assert_eq!(state.message.as_deref(), Some("Invalid credentials"));
    assert!(state.redirect_to.is_none());
    assert_eq!(state.toast.map(|t| t.kind), Some(ToastKind::Error));
    assert_eq!(backend.refresh_calls(), 0);
    assert!(jar.changes().is_empty());
    Ok(())
}

#[tokio::test]
async fn login_rejects_invalid_form_without_calling_backend() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, jar) = client_with(&backend, "")?;

    let state = login(&client, &form(&[("email", "not-an-email")]), false).await;

    assert!(!state.success);
    assert_eq!(state.message.as_deref(), Some(INVALID_INPUT_MESSAGE));
    assert!(state.field_errors.is_some());
    assert_eq!(backend.current_tokens().access_token, "access-0");
    assert!(jar.changes().is_empty());
    Ok(())
}

#[tokio::test]
async fn login_debug_trace_hides_password() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, _jar) = client_with(&backend, "")?;

    let state = login(
        &client,
        &form(&[("email", "user@example.com"), ("password", MOCK_PASSWORD)]),
        true,
    )
    .await;

    let debug = state.debug.ok_or_else(|| anyhow::anyhow!("missing debug info"))?;
    assert_eq!(debug.endpoint, "Login User");
    assert_eq!(debug.payload["email"], "user@example.com");
    assert_ne!(debug.payload["password"], MOCK_PASSWORD);
    Ok(())
}

#[tokio::test]
async fn register_creates_account_and_session() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, jar) = client_with(&backend, "")?;

    let state = register(
        &client,
        &form(&[
            ("name", "New User"),
            ("email", "new@example.com"),
            ("password", "longenough"),
            ("confirmPassword", "longenough"),
        ]),
        false,
    )
    .await;

    assert!(state.success, "{:?}", state.message);
    assert_eq!(state.redirect_to.as_deref(), Some(HOME_PATH));
    assert_eq!(state.toast.map(|t| t.message).as_deref(), Some(REGISTER_SUCCESS_MESSAGE));
    assert_eq!(jar.get(ACCESS_TOKEN).as_deref(), Some("access-1"));
    Ok(())
}

#[tokio::test]
async fn register_surfaces_backend_conflict() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, jar) = client_with(&backend, "")?;

    let state = register(
        &client,
        &form(&[
            ("name", "Taken"),
            ("email", TAKEN_EMAIL),
            ("password", "longenough"),
            ("confirmPassword", "longenough"),
        ]),
        false,
    )
    .await;

    assert!(!state.success);
    assert_eq!(state.message.as_deref(), Some("Email already registered"));
    assert!(jar.changes().is_empty());
    Ok(())
}

#[tokio::test]
async fn register_reports_password_mismatch() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, _jar) = client_with(&backend, "")?;

    let state = register(
        &client,
        &form(&[
            ("name", "New User"),
            ("email", "new@example.com"),
            ("password", "longenough"),
            ("confirmPassword", "different"),
        ]),
        false,
    )
    .await;

    let errors = state.field_errors.unwrap_or_default();
    assert_eq!(errors.get("confirmPassword"), Some(&vec![PASSWORDS_DIFFER.to_owned()]));
    Ok(())
}

#[tokio::test]
async fn logout_notifies_backend_and_clears_cookies() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, jar) = client_with(&backend, "accessToken=access-0; refreshToken=refresh-0")?;

    logout(&client).await;

    assert_eq!(backend.logout_calls(), 1);
    assert!(jar.get(ACCESS_TOKEN).is_none());
    assert!(jar.get(REFRESH_TOKEN).is_none());
    let deleted = jar
        .changes()
        .into_iter()
        .filter(|(_, c)| matches!(c, CookieChange::Delete { .. }))
        .count();
    assert_eq!(deleted, 2);
    Ok(())
}

#[tokio::test]
async fn logout_without_session_skips_backend() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let (client, jar) = client_with(&backend, "")?;

    logout(&client).await;

    assert_eq!(backend.logout_calls(), 0);
    assert_eq!(jar.set_cookie_headers().len(), 2);
    Ok(())
}

#[tokio::test]
async fn logout_clears_cookies_when_backend_is_down() -> anyhow::Result<()> {
    let jar = Arc::new(CookieJar::from_cookie_header("accessToken=a; refreshToken=r"));
    let store: Arc<dyn CredentialStore> = jar.clone();
    let client = ApiClient::new("http://127.0.0.1:1", http_client()?, store, false);

    logout(&client).await;

    assert!(jar.get(ACCESS_TOKEN).is_none());
    assert!(jar.get(REFRESH_TOKEN).is_none());
    Ok(())
}
