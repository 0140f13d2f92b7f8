// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the gate HTTP API against a mock backend.
//!
//! Uses `axum_test::TestServer` in front of the router; the backend is a
//! real listener on 127.0.0.1.

use std::sync::Arc;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use authgate::config::GateConfig;
use authgate::state::GateState;
use authgate::test_support::{MockBackend, MOCK_PASSWORD};
use authgate::transport::build_router;

fn test_server(backend: &MockBackend) -> anyhow::Result<TestServer> {
    let state = Arc::new(GateState::new(GateConfig::test(&backend.base_url()))?);
    TestServer::new(build_router(state)).map_err(|e| anyhow::anyhow!("{e}"))
}

fn set_cookies(resp: &axum_test::TestResponse) -> Vec<String> {
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_owned))
        .collect()
}

#[tokio::test]
async fn health_reports_running() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server.get("/api/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body, json!({ "status": "running" }));
    Ok(())
}

#[tokio::test]
async fn login_sets_session_cookies() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server
        .post("/auth/login")
        .form(&[("email", "user@example.com"), ("password", MOCK_PASSWORD)])
        .await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["redirectTo"], "/dashboard");
    assert_eq!(body["_toast"]["type"], "success");
    assert!(body.get("_debug").is_none());

    let cookies = set_cookies(&resp);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=access-1;")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=refresh-1;")));
    assert!(cookies.iter().all(|c| c.contains("HttpOnly") && !c.contains("Secure")));
    Ok(())
}

#[tokio::test]
async fn login_validation_errors_are_returned() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server.post("/auth/login").form(&[("email", "nope")]).await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please check your inputs.");
    assert_eq!(body["fieldErrors"]["email"][0], "Please enter a valid email");
    assert_eq!(body["fieldErrors"]["password"][0], "Password is required");
    assert!(set_cookies(&resp).is_empty());
    Ok(())
}

#[tokio::test]
async fn register_creates_session() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server
        .post("/auth/register")
        .form(&[
            ("name", "Ada"),
            ("email", "ada@example.com"),
            ("password", "correct horse"),
            ("confirmPassword", "correct horse"),
        ])
        .await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(set_cookies(&resp).len(), 2);
    Ok(())
}

#[tokio::test]
async fn logout_expires_cookies() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server
        .post("/auth/logout")
        .add_header(COOKIE, HeaderValue::from_static("accessToken=access-0; refreshToken=refresh-0"))
        .await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(backend.logout_calls(), 1);
    let cookies = set_cookies(&resp);
    assert_eq!(cookies.len(), 2);
    assert!(cookies[0].starts_with("accessToken=;"), "{}", cookies[0]);
    assert!(cookies[1].starts_with("refreshToken=;"), "{}", cookies[1]);
    assert!(cookies.iter().all(|c| c.contains("Max-Age=0") && c.contains("Path=/")));
    Ok(())
}

#[tokio::test]
async fn proxy_forwards_with_bearer() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server
        .get("/api/proxy/users")
        .add_query_param("page", 3)
        .add_header(COOKIE, HeaderValue::from_static("accessToken=access-0; refreshToken=refresh-0"))
        .await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["data"]["method"], "GET");
    assert_eq!(body["data"]["path"], "/users");
    assert_eq!(body["data"]["query"], "page=3");
    assert_eq!(backend.refresh_calls(), 0);
    assert!(set_cookies(&resp).is_empty());
    Ok(())
}

#[tokio::test]
async fn proxy_forwards_json_body() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server
        .post("/api/proxy/users")
        .add_header(COOKIE, HeaderValue::from_static("accessToken=access-0; refreshToken=refresh-0"))
        .json(&json!({ "name": "Ada" }))
        .await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["data"]["method"], "POST");
    assert_eq!(body["data"]["body"]["name"], "Ada");
    Ok(())
}

#[tokio::test]
async fn proxy_refreshes_expired_token() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server
        .get("/api/proxy/users/7")
        .add_header(COOKIE, HeaderValue::from_static("accessToken=stale; refreshToken=refresh-0"))
        .await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["data"]["path"], "/users/7");
    assert_eq!(backend.refresh_calls(), 1);

    // Refreshed pair carries no Max-Age.
    let cookies = set_cookies(&resp);
    assert_eq!(cookies.len(), 2);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=access-1;")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=refresh-1;")));
    assert!(cookies.iter().all(|c| !c.contains("Max-Age") && c.contains("SameSite=Lax")));
    Ok(())
}

#[tokio::test]
async fn proxy_reports_session_expired() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server
        .get("/api/proxy/users")
        .add_header(COOKIE, HeaderValue::from_static("accessToken=stale; refreshToken=revoked"))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "SESSION_EXPIRED");
    assert_eq!(body["error"]["message"], "Session expired. Please log in again.");
    assert_eq!(set_cookies(&resp).len(), 2);
    Ok(())
}

#[tokio::test]
async fn proxy_relays_backend_errors() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server
        .get("/api/proxy/boom")
        .add_header(COOKIE, HeaderValue::from_static("accessToken=access-0"))
        .await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = resp.json();
    assert_eq!(body["message"], "Something broke");
    assert_eq!(body["path"], "/boom");
    Ok(())
}

#[tokio::test]
async fn proxy_rejects_malformed_json() -> anyhow::Result<()> {
    let backend = MockBackend::start().await?;
    let server = test_server(&backend)?;

    let resp = server.post("/api/proxy/users").text("{not json").await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(backend.api_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn proxy_maps_unreachable_backend() -> anyhow::Result<()> {
    let state = Arc::new(GateState::new(GateConfig::test("http://127.0.0.1:1"))?);
    let server = TestServer::new(build_router(state)).map_err(|e| anyhow::anyhow!("{e}"))?;

    let resp = server.get("/api/proxy/users").await;
    resp.assert_status(StatusCode::BAD_GATEWAY);

    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
    Ok(())
}
