// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound access to the backend API.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod query;
pub mod rest;

pub use client::{ApiClient, RequestOptions};
