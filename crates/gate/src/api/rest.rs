// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Verb helpers over [`ApiClient::request`].

use std::fmt::Display;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::client::{ApiClient, RequestOptions};
use crate::api::envelope::ApiSuccess;
use crate::api::query::{build_query_string, QueryParams};
use crate::error::ApiError;

fn json_body<B: Serialize + ?Sized>(payload: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(payload).map_err(ApiError::encode)
}

impl ApiClient {
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &QueryParams<'_>,
    ) -> Result<ApiSuccess<T>, ApiError> {
        let url = format!("{endpoint}{}", build_query_string(params));
        self.request(&url, RequestOptions::new(Method::GET)).await
    }

    pub async fn get_by_id<T: DeserializeOwned>(
        &self,
        base: &str,
        id: impl Display,
        params: &QueryParams<'_>,
    ) -> Result<ApiSuccess<T>, ApiError> {
        let url = format!("{base}/{id}{}", build_query_string(params));
        self.request(&url, RequestOptions::new(Method::GET)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &B,
    ) -> Result<ApiSuccess<T>, ApiError> {
        let options = RequestOptions::new(Method::POST).with_body(json_body(payload)?);
        self.request(endpoint, options).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &B,
    ) -> Result<ApiSuccess<T>, ApiError> {
        let options = RequestOptions::new(Method::PUT).with_body(json_body(payload)?);
        self.request(endpoint, options).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        payload: &B,
    ) -> Result<ApiSuccess<T>, ApiError> {
        let options = RequestOptions::new(Method::PATCH).with_body(json_body(payload)?);
        self.request(endpoint, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<ApiSuccess<T>, ApiError> {
        self.request(endpoint, RequestOptions::new(Method::DELETE)).await
    }
}
