// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Device geolocation capability.
//!
//! The actual permission prompt and GPS acquisition happen in the browser;
//! the client reports the outcome (a fix or a permission error) and the
//! engine consumes it through the `Geolocation` trait. Max-age rules for
//! cached fixes are enforced here; the acquisition timeout is enforced by
//! the caller.

use crate::models::DeviceFix;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;

/// Acquisition bounds passed to the capability.
#[derive(Debug, Clone, Copy)]
pub struct GeoOptions {
    /// Oldest acceptable cached fix, in seconds
    pub maximum_age_secs: i64,
}

/// Why a fix could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    /// The user refused the permission prompt
    Denied,
    /// No capability, or no usable fix
    Unavailable,
}

/// A source of device GPS fixes.
#[async_trait]
pub trait Geolocation: Send + Sync {
    async fn current_fix(&self, opts: &GeoOptions) -> Result<DeviceFix, GeolocationError>;
}

/// Geolocation backed by outcomes reported by the connected client.
///
/// Holds the most recent report only; a fix older than the caller's
/// max-age bound counts as unavailable.
#[derive(Default)]
pub struct ReportedGeolocation {
    last: RwLock<Option<Result<DeviceFix, GeolocationError>>>,
}

impl ReportedGeolocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful fix from the client.
    pub fn report_fix(&self, fix: DeviceFix) {
        *self.last.write().expect("geolocation lock poisoned") = Some(Ok(fix));
    }

    /// Record a permission failure from the client.
    pub fn report_error(&self, error: GeolocationError) {
        *self.last.write().expect("geolocation lock poisoned") = Some(Err(error));
    }
}

#[async_trait]
impl Geolocation for ReportedGeolocation {
    async fn current_fix(&self, opts: &GeoOptions) -> Result<DeviceFix, GeolocationError> {
        let last = *self.last.read().expect("geolocation lock poisoned");
        match last {
            None => Err(GeolocationError::Unavailable),
            Some(Err(e)) => Err(e),
            Some(Ok(fix)) => {
                let age = Utc::now().signed_duration_since(fix.timestamp);
                if age.num_seconds() > opts.maximum_age_secs {
                    tracing::debug!(
                        age_secs = age.num_seconds(),
                        "Reported fix too old, treating as unavailable"
                    );
                    Err(GeolocationError::Unavailable)
                } else {
                    Ok(fix)
                }
            }
        }
    }
}
