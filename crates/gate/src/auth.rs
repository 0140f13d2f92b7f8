// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Login, registration and logout actions.

use reqwest::Method;
use serde_json::json;
use tracing::{info, warn};

use crate::action::{run_form_action, ActionOptions, ActionState};
use crate::api::endpoints::{AUTH_LOGIN, AUTH_LOGOUT, AUTH_REGISTER};
use crate::api::envelope::{AuthData, User};
use crate::api::{ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::guard::HOME_PATH;
use crate::session;
use crate::validation::{FormData, LoginInput, RegisterInput};

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful. Redirecting...";
pub const REGISTER_SUCCESS_MESSAGE: &str = "Account created successfully";

/// Validate the form, exchange the credentials for tokens and open a session.
pub async fn login(client: &ApiClient, form: &FormData, debug: bool) -> ActionState<Option<User>> {
    let options = ActionOptions::default().success_toast(LOGIN_SUCCESS_MESSAGE);
    let state = run_form_action("Login User", form, &options, debug, |input: LoginInput| async move {
        let body = json!({ "email": &input.email, "password": &input.password });
        let resp = client
            .request::<AuthData>(
                AUTH_LOGIN,
                RequestOptions::new(Method::POST).with_body(body).without_refresh(),
            )
            .await?;
        let tokens =
            resp.data.tokens().ok_or_else(|| ApiError::decode("login response carried no tokens"))?;
        session::create_session(client.store().as_ref(), &tokens, client.secure_cookies());
        info!(email = %input.email, "user logged in");
        Ok::<_, ApiError>(resp.data.user)
    })
    .await;
    redirect_on_success(state)
}

/// Validate the form and create the account. A session is opened when the
/// backend issues tokens with the new account.
pub async fn register(
    client: &ApiClient,
    form: &FormData,
    debug: bool,
) -> ActionState<Option<User>> {
    let options = ActionOptions::default().success_toast(REGISTER_SUCCESS_MESSAGE);
    let state =
        run_form_action("Register User", form, &options, debug, |input: RegisterInput| async move {
            let body =
                json!({ "name": &input.name, "email": &input.email, "password": &input.password });
            let resp = client
                .request::<AuthData>(
                    AUTH_REGISTER,
                    RequestOptions::new(Method::POST).with_body(body).without_refresh(),
                )
                .await?;
            match resp.data.tokens() {
                Some(tokens) => {
                    session::create_session(
                        client.store().as_ref(),
                        &tokens,
                        client.secure_cookies(),
                    );
                }
                None => info!(email = %input.email, "registered without a session"),
            }
            info!(email = %input.email, "user registered");
            Ok::<_, ApiError>(resp.data.user)
        })
        .await;
    redirect_on_success(state)
}

/// Tell the backend the session is over, then drop the local credentials
/// whatever it answered.
pub async fn logout(client: &ApiClient) {
    if session::access_token(client.store().as_ref()).is_some() {
        let result = client
            .request::<serde_json::Value>(
                AUTH_LOGOUT,
                RequestOptions::new(Method::POST).without_refresh(),
            )
            .await;
        if let Err(e) = result {
            warn!(err = %e, "backend logout failed");
        }
    }
    session::delete_session(client.store().as_ref());
    info!("user logged out");
}

fn redirect_on_success<T>(state: ActionState<T>) -> ActionState<T> {
    if state.success {
        state.with_redirect(HOME_PATH)
    } else {
        state
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
