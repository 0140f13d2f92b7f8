// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn empty_params_yield_empty_string() {
    assert_eq!(build_query_string(&[]), "");
}

#[test]
fn none_values_are_skipped() {
    let qs = build_query_string(&[("page", None), ("limit", None)]);
    assert_eq!(qs, "");
}

#[test]
fn keeps_order_and_drops_missing() {
    let qs = build_query_string(&[
        ("page", Some("1".to_owned())),
        ("search", None),
        ("limit", Some(10.to_string())),
        ("active", Some(true.to_string())),
    ]);
    assert_eq!(qs, "?page=1&limit=10&active=true");
}

#[yare::parameterized(
    plain = { "abc", "abc" },
    space = { "a b", "a+b" },
    ampersand = { "a&b=c", "a%26b%3Dc" },
    utf8 = { "é", "%C3%A9" },
    email = { "me@example.com", "me%40example.com" },
)]
fn encodes_like_url_search_params(input: &str, expected: &str) {
    assert_eq!(encode(input), expected);
}
