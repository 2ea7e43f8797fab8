// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! IP-based geolocation client.
//!
//! Called once at startup when no cached location exists. Failures here
//! are never shown to the user; the caller falls back to a hardcoded
//! default city.

use crate::error::AppError;
use crate::models::UserLocation;
use async_trait::async_trait;
use serde::Deserialize;

/// A source of coarse, IP-derived locations.
#[async_trait]
pub trait IpLocate: Send + Sync {
    async fn locate(&self) -> Result<UserLocation, AppError>;
}

/// Client for the hosted IP-geolocation function.
#[derive(Clone)]
pub struct HttpIpLocator {
    http: reqwest::Client,
    endpoint: String,
}

/// Function response shape.
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    success: bool,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl IpLookupResponse {
    fn into_location(self) -> Option<UserLocation> {
        if !self.success {
            return None;
        }
        Some(UserLocation {
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            ..UserLocation::default()
        })
    }
}

impl HttpIpLocator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl IpLocate for HttpIpLocator {
    async fn locate(&self) -> Result<UserLocation, AppError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("IP lookup request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "IP lookup returned HTTP {}",
                response.status()
            )));
        }

        let body: IpLookupResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("IP lookup parse error: {}", e)))?;

        body.into_location()
            .ok_or_else(|| AppError::Upstream("IP lookup reported failure".to_string()))
    }
}
