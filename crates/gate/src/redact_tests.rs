// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::*;

#[test]
fn redacts_nested_credentials() {
    let input = json!({
        "email": "a@example.com",
        "password": "hunter22",
        "data": {
            "accessToken": "a",
            "refreshToken": "r",
            "user": { "id": 1, "Authorization": "Bearer x" },
        },
        "items": [{ "confirmPassword": "p" }, 3],
    });
    let out = redact(&input);
    assert_eq!(out["email"], "a@example.com");
    assert_eq!(out["password"], REDACTED);
    assert_eq!(out["data"]["accessToken"], REDACTED);
    assert_eq!(out["data"]["refreshToken"], REDACTED);
    assert_eq!(out["data"]["user"]["id"], 1);
    assert_eq!(out["data"]["user"]["Authorization"], REDACTED);
    assert_eq!(out["items"][0]["confirmPassword"], REDACTED);
    assert_eq!(out["items"][1], 3);
}

#[test]
fn scalars_pass_through() {
    assert_eq!(redact(&json!("token")), json!("token"));
    assert_eq!(redact(&json!(null)), json!(null));
}

#[test]
fn sensitive_object_values_are_replaced_whole() {
    let out = redact(&json!({ "tokens": { "access": "a" } }));
    assert_eq!(out["tokens"], REDACTED);
}
