// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scrub credentials out of JSON before it reaches the logs.

use serde_json::Value;

pub const REDACTED: &str = "***REDACTED***";

const SENSITIVE_KEYS: &[&str] = &["password", "token", "authorization"];

fn is_sensitive(key: &str) -> bool {
    let key = key.to_lowercase();
    SENSITIVE_KEYS.iter().any(|k| key.contains(k))
}

/// Copy of `value` with every sensitive object key's value replaced.
///
/// A key is sensitive when its lowercase form contains `password`, `token`
/// or `authorization` (so `accessToken`, `refreshToken`, `confirmPassword`
/// are all covered). Arrays and nested objects are walked.
pub fn redact(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = if is_sensitive(k) {
                        Value::String(REDACTED.to_owned())
                    } else {
                        redact(v)
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
#[path = "redact_tests.rs"]
mod tests;
