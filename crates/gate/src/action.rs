// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uniform result envelope for form actions.
//!
//! Every action runs through [`run_action`] (or [`run_form_action`] when it
//! starts from raw form data), which times it, logs failures and folds the
//! outcome into an [`ActionState`] the browser can render directly.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use crate::redact::redact;
use crate::validation::{FieldErrors, FormData, FormSchema};

pub const INVALID_INPUT_MESSAGE: &str = "Please check your inputs.";
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation successful";
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub message: String,
}

/// Development-only trace of an action run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugInfo {
    pub endpoint: String,
    pub payload: Value,
    pub response: Value,
    /// Milliseconds.
    pub duration: u64,
    /// Epoch milliseconds.
    pub timestamp: u64,
}

/// Outcome of an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionState<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Where the browser should navigate next.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(rename = "_toast", default, skip_serializing_if = "Option::is_none")]
    pub toast: Option<Toast>,
    #[serde(rename = "_debug", default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugInfo>,
}

impl<T> ActionState<T> {
    /// Rejected before the action ran.
    pub fn invalid(field_errors: FieldErrors) -> Self {
        Self {
            success: false,
            message: Some(INVALID_INPUT_MESSAGE.to_owned()),
            field_errors: Some(field_errors),
            data: None,
            redirect_to: None,
            toast: None,
            debug: None,
        }
    }

    pub fn with_redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect_to = Some(to.into());
        self
    }
}

/// Toast and message overrides for an action.
#[derive(Debug, Clone)]
pub struct ActionOptions {
    pub show_success_toast: bool,
    pub success_message: Option<String>,
    pub show_error_toast: bool,
    pub error_message: Option<String>,
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            show_success_toast: false,
            success_message: None,
            show_error_toast: true,
            error_message: None,
        }
    }
}

impl ActionOptions {
    pub fn success_toast(mut self, message: impl Into<String>) -> Self {
        self.show_success_toast = true;
        self.success_message = Some(message.into());
        self
    }
}

fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Run `logic` and fold its result into an [`ActionState`].
///
/// `debug` attaches a [`DebugInfo`] with the redacted payload and response.
pub async fn run_action<T, E, F, Fut>(
    name: &str,
    payload: Value,
    options: &ActionOptions,
    debug: bool,
    logic: F,
) -> ActionState<T>
where
    T: Serialize,
    E: Display,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let result = logic().await;
    let duration = start.elapsed().as_millis() as u64;

    let trace = |response: Value| {
        debug.then(|| DebugInfo {
            endpoint: name.to_owned(),
            payload: redact(&payload),
            response: redact(&response),
            duration,
            timestamp: epoch_ms(),
        })
    };

    match result {
        Ok(data) => {
            info!(action = name, duration_ms = duration, "action succeeded");
            let toast = options.show_success_toast.then(|| Toast {
                kind: ToastKind::Success,
                message: options
                    .success_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_owned()),
            });
            let response = serde_json::to_value(&data).unwrap_or(Value::Null);
            ActionState {
                success: true,
                message: None,
                field_errors: None,
                data: Some(data),
                redirect_to: None,
                toast,
                debug: trace(response),
            }
        }
        Err(e) => {
            error!(action = name, duration_ms = duration, err = %e, "action failed");
            let raw = e.to_string();
            let message = options.error_message.clone().unwrap_or_else(|| {
                if raw.is_empty() {
                    DEFAULT_ERROR_MESSAGE.to_owned()
                } else {
                    raw.clone()
                }
            });
            let toast = options
                .show_error_toast
                .then(|| Toast { kind: ToastKind::Error, message: message.clone() });
            ActionState {
                success: false,
                message: Some(message),
                field_errors: None,
                data: None,
                redirect_to: None,
                toast,
                debug: trace(serde_json::json!({ "error": raw })),
            }
        }
    }
}

/// Validate `form` as `S`, then run `logic` with the typed input.
pub async fn run_form_action<S, T, E, F, Fut>(
    name: &str,
    form: &FormData,
    options: &ActionOptions,
    debug: bool,
    logic: F,
) -> ActionState<T>
where
    S: FormSchema,
    T: Serialize,
    E: Display,
    F: FnOnce(S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let input = match S::parse(form) {
        Ok(input) => input,
        Err(field_errors) => {
            info!(action = name, fields = field_errors.len(), "action input rejected");
            return ActionState::invalid(field_errors);
        }
    };
    let payload = serde_json::to_value(&input).unwrap_or(Value::Null);
    run_action(name, payload, options, debug, || logic(input)).await
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
