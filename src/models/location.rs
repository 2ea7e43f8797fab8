// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location models: the browsing/delivery context and its provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The user's resolved geographic context.
///
/// A cached, best-effort snapshot. Overwritten wholesale by each
/// detection/entry path; partial fields from different sources are never
/// merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserLocation {
    pub city: String,
    pub state: String,
    pub country: String,
    /// Empty or exactly 6 digits
    #[serde(default)]
    pub pincode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl UserLocation {
    /// The fallback adopted when IP detection fails outright.
    pub fn default_fallback() -> Self {
        Self {
            city: "Delhi".to_string(),
            state: "Delhi".to_string(),
            country: "India".to_string(),
            ..Self::default()
        }
    }
}

/// Where the current `UserLocation` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum LocationSource {
    /// Restored from the local cache of a prior session
    Stored,
    /// Loaded from the authenticated user's profile
    Profile,
    /// IP-based detection
    Ip,
    /// Device GPS fix, reverse-geocoded
    Gps,
    /// Entered by the user
    Manual,
}

/// Outcome of the device geolocation permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum PermissionStatus {
    Unknown,
    Granted,
    Denied,
    Unavailable,
}

impl Default for PermissionStatus {
    fn default() -> Self {
        Self::Unknown
    }
}

/// A GPS fix as acquired by the device, with acquisition time so cached
/// fixes can be age-checked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}
