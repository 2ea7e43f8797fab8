// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location context routes.
//!
//! `POST /api/location/request` carries the outcome of the browser's
//! permission prompt (a fix, or a permission error); the engine applies
//! timeout and max-age rules and decides what to adopt.

use crate::error::{AppError, Result};
use crate::models::{DeviceFix, UserLocation};
use crate::services::geolocation::GeolocationError;
use crate::services::location::{LocationSnapshot, PincodeLookupOutcome};
use crate::services::pincode::{is_valid_pincode, PincodeResult};
use crate::time_utils::parse_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/location", get(get_location))
        .route("/api/location/request", post(request_location))
        .route("/api/location/manual", post(set_manual_location))
        .route("/api/location/asked", post(mark_asked))
        .route("/api/location/pincode/{pincode}", get(lookup_pincode))
        .route("/api/delivery/{pincode}", get(check_delivery))
}

// ─── Snapshot ────────────────────────────────────────────────────

/// Current location context.
async fn get_location(State(state): State<Arc<AppState>>) -> Json<LocationSnapshot> {
    Json(state.location.snapshot())
}

// ─── GPS Detection ───────────────────────────────────────────────

/// Device outcome reported by the browser alongside a detection request.
#[derive(Debug, Default, Deserialize)]
pub struct ReportedOutcome {
    pub fix: Option<ReportedFix>,
    /// `"denied"` or `"unavailable"`
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReportedFix {
    pub latitude: f64,
    pub longitude: f64,
    /// RFC3339 acquisition time; defaults to now
    pub timestamp: Option<String>,
}

/// User-initiated GPS detection. The body is optional: an empty body
/// triggers detection against whatever the capability last reported.
async fn request_location(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<Json<LocationSnapshot>> {
    let outcome: ReportedOutcome = if body.is_empty() {
        ReportedOutcome::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    if let Some(fix) = outcome.fix {
        if !(-90.0..=90.0).contains(&fix.latitude) || !(-180.0..=180.0).contains(&fix.longitude) {
            return Err(AppError::BadRequest(
                "Coordinates out of range".to_string(),
            ));
        }
        state.geolocation.report_fix(DeviceFix {
            latitude: fix.latitude,
            longitude: fix.longitude,
            timestamp: fix
                .timestamp
                .as_deref()
                .and_then(parse_rfc3339)
                .unwrap_or_else(chrono::Utc::now),
        });
    } else if let Some(error) = outcome.error.as_deref() {
        let error = match error {
            "denied" => GeolocationError::Denied,
            "unavailable" => GeolocationError::Unavailable,
            other => {
                return Err(AppError::BadRequest(format!(
                    "Unknown geolocation error {:?}",
                    other
                )))
            }
        };
        state.geolocation.report_error(error);
    }

    Ok(Json(state.location.request_location().await))
}

// ─── Manual Entry ────────────────────────────────────────────────

fn default_country() -> String {
    "India".to_string()
}

/// Manually entered location.
#[derive(Debug, Deserialize, Validate)]
pub struct ManualLocationInput {
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "State is required"))]
    pub state: String,
    #[serde(default = "default_country")]
    pub country: String,
    /// Empty or exactly 6 digits
    #[serde(default)]
    #[validate(custom(function = validate_optional_pincode))]
    pub pincode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn validate_optional_pincode(value: &str) -> std::result::Result<(), ValidationError> {
    if value.is_empty() || is_valid_pincode(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("pincode");
        err.message = Some("PIN code must be 6 digits".into());
        Err(err)
    }
}

/// Adopt a manually entered location.
async fn set_manual_location(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ManualLocationInput>,
) -> Result<Json<LocationSnapshot>> {
    input.validate()?;

    let location = UserLocation {
        city: input.city,
        state: input.state,
        country: input.country,
        pincode: input.pincode,
        latitude: input.latitude,
        longitude: input.longitude,
    };

    Ok(Json(state.location.set_manual_location(location)))
}

/// Record that the location prompt has been shown.
async fn mark_asked(State(state): State<Arc<AppState>>) -> StatusCode {
    state.location.mark_asked();
    StatusCode::NO_CONTENT
}

// ─── Pincode & Delivery ──────────────────────────────────────────

/// Pincode lookup result as sent to the UI. `superseded` marks a
/// response the client must discard because a newer lookup exists.
#[derive(Debug, Serialize)]
pub struct PincodeLookupResponse {
    #[serde(flatten)]
    pub result: Option<PincodeResult>,
    pub superseded: bool,
}

/// Resolve city/state for a 6-digit pincode.
async fn lookup_pincode(
    State(state): State<Arc<AppState>>,
    Path(pincode): Path<String>,
) -> Result<Json<PincodeLookupResponse>> {
    if !is_valid_pincode(&pincode) {
        return Err(AppError::BadRequest("PIN code must be 6 digits".to_string()));
    }

    let response = match state.location.lookup_pincode(&pincode).await {
        PincodeLookupOutcome::Completed(result) => PincodeLookupResponse {
            result: Some(result),
            superseded: false,
        },
        PincodeLookupOutcome::Superseded => PincodeLookupResponse {
            result: None,
            superseded: true,
        },
    };
    Ok(Json(response))
}

/// Delivery estimate for a pincode.
async fn check_delivery(
    State(state): State<Arc<AppState>>,
    Path(pincode): Path<String>,
) -> Result<Json<crate::models::DeliveryInfo>> {
    if !is_valid_pincode(&pincode) {
        return Err(AppError::BadRequest("PIN code must be 6 digits".to_string()));
    }
    Ok(Json(state.location.check_delivery(&pincode).await))
}
