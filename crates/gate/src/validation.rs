// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Form validation for the login and registration actions.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Decoded `application/x-www-form-urlencoded` body.
pub type FormData = HashMap<String, String>;

/// Messages per offending field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub const INVALID_EMAIL: &str = "Please enter a valid email";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
pub const CONFIRM_REQUIRED: &str = "Please confirm your password";
pub const PASSWORDS_DIFFER: &str = "Passwords do not match";

/// A typed form parsed out of raw [`FormData`].
pub trait FormSchema: Sized + Serialize {
    fn parse(form: &FormData) -> Result<Self, FieldErrors>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Default)]
struct Collector {
    errors: FieldErrors,
}

impl Collector {
    fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.errors.entry(field.to_owned()).or_default().push(message.to_owned());
        }
    }

    fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

fn field(form: &FormData, name: &str) -> String {
    form.get(name).cloned().unwrap_or_default()
}

/// Loose address check: `local@domain.tld`, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

impl FormSchema for LoginInput {
    fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        let email = field(form, "email");
        let password = field(form, "password");

        let mut c = Collector::default();
        c.check(is_valid_email(&email), "email", INVALID_EMAIL);
        c.check(!password.is_empty(), "password", PASSWORD_REQUIRED);
        c.finish(Self { email, password })
    }
}

impl FormSchema for RegisterInput {
    fn parse(form: &FormData) -> Result<Self, FieldErrors> {
        let name = field(form, "name");
        let email = field(form, "email");
        let password = field(form, "password");
        let confirm_password = field(form, "confirmPassword");

        let mut c = Collector::default();
        c.check(name.chars().count() >= 2, "name", NAME_TOO_SHORT);
        c.check(is_valid_email(&email), "email", INVALID_EMAIL);
        c.check(password.chars().count() >= 8, "password", PASSWORD_TOO_SHORT);
        c.check(!confirm_password.is_empty(), "confirmPassword", CONFIRM_REQUIRED);
        c.check(password == confirm_password, "confirmPassword", PASSWORDS_DIFFER);
        c.finish(Self { name, email, password, confirm_password })
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
