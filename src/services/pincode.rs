// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! PIN code directory: maps a 6-digit postal code to city/state.
//!
//! Callers are responsible for validating the format before calling; the
//! lookup itself never returns an `Err`: remote failures map to a
//! structured failure with a generic user-facing message.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// What the UI is told when the directory cannot be reached. Raw error
/// detail stays in the log.
pub const PINCODE_LOOKUP_FAILED: &str = "Unable to look up PIN code. Please try again.";

/// Structured lookup result. `success: false` carries a user-facing
/// message in `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PincodeResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PincodeResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            city: None,
            state: None,
            country: None,
            error: Some(message.into()),
        }
    }
}

/// A PIN code lookup source.
#[async_trait]
pub trait PincodeDirectory: Send + Sync {
    async fn lookup(&self, pincode: &str) -> PincodeResult;
}

/// Client for the hosted pincode-lookup function.
#[derive(Clone)]
pub struct HttpPincodeDirectory {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpPincodeDirectory {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PincodeDirectory for HttpPincodeDirectory {
    async fn lookup(&self, pincode: &str) -> PincodeResult {
        let response = match self
            .http
            .get(&self.endpoint)
            .query(&[("code", pincode)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, pincode, "Pincode lookup request failed");
                return PincodeResult::failed(PINCODE_LOOKUP_FAILED);
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), pincode, "Pincode lookup error status");
            return PincodeResult::failed(PINCODE_LOOKUP_FAILED);
        }

        match response.json::<PincodeResult>().await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, pincode, "Pincode lookup parse error");
                PincodeResult::failed(PINCODE_LOOKUP_FAILED)
            }
        }
    }
}

/// Format check shared by routes and forms: exactly 6 ASCII digits.
pub fn is_valid_pincode(candidate: &str) -> bool {
    candidate.len() == 6 && candidate.chars().all(|c| c.is_ascii_digit())
}
