// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The location store: holds the single current browsing/delivery context,
//! reconciles candidate sources at startup, and fronts the pincode,
//! delivery and geolocation collaborators.
//!
//! Resolution order at startup (first success wins, no field merging):
//! 1. local cache from a prior session
//! 2. authenticated profile fields (non-empty city), short-circuiting IP detection
//! 3. background IP detection, falling back to a hardcoded default city
//!
//! Detection and pincode lookups carry generation counters: a response
//! belonging to a superseded request is discarded, so the adopted value
//! always corresponds to the most recently initiated request whose
//! response has arrived.

use crate::db::local::keys;
use crate::db::{FirestoreDb, LocalStore};
use crate::error::AppError;
use crate::models::{LocationSource, PermissionStatus, UserLocation};
use crate::services::delivery::DeliveryService;
use crate::services::geocoding::ReverseGeocode;
use crate::services::geolocation::{GeoOptions, Geolocation, GeolocationError};
use crate::services::iplocate::IpLocate;
use crate::services::pincode::{PincodeDirectory, PincodeResult};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// How long a user-initiated GPS acquisition may take.
pub const GEO_TIMEOUT: Duration = Duration::from_secs(10);
/// Oldest acceptable cached device fix.
pub const GEO_MAX_FIX_AGE_SECS: i64 = 5 * 60;

/// Persisted location fields of a user profile.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn location(&self, user_id: &str) -> Result<Option<UserLocation>, AppError>;
    async fn save_location(
        &self,
        user_id: &str,
        location: &UserLocation,
    ) -> Result<(), AppError>;
}

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn location(&self, user_id: &str) -> Result<Option<UserLocation>, AppError> {
        self.get_profile_location(user_id).await
    }

    async fn save_location(
        &self,
        user_id: &str,
        location: &UserLocation,
    ) -> Result<(), AppError> {
        self.set_profile_location(user_id, location).await
    }
}

/// What the UI sees of the location context.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LocationSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<UserLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<LocationSource>,
    pub permission: PermissionStatus,
    /// The UI should open the manual-entry dialog
    pub manual_entry_open: bool,
    /// The location prompt has not been shown yet this install
    pub prompt_needed: bool,
}

/// Result of a pincode lookup as seen by the initiator.
#[derive(Debug, Clone)]
pub enum PincodeLookupOutcome {
    /// This lookup is still the most recently initiated one
    Completed(PincodeResult),
    /// A newer lookup was initiated while this one was in flight;
    /// the response must be discarded
    Superseded,
}

#[derive(Default)]
struct LocationState {
    location: Option<UserLocation>,
    source: Option<LocationSource>,
    permission: PermissionStatus,
    manual_entry_open: bool,
}

struct LocationServiceInner {
    local: LocalStore,
    profiles: Arc<dyn ProfileStore>,
    ip: Arc<dyn IpLocate>,
    geocoder: Arc<dyn ReverseGeocode>,
    pincodes: Arc<dyn PincodeDirectory>,
    delivery: DeliveryService,
    geolocation: Arc<dyn Geolocation>,
    /// Signed-in user served by this process, if any
    user_id: Option<String>,
    state: RwLock<LocationState>,
    detect_generation: AtomicU64,
    pincode_generation: AtomicU64,
}

/// The location context service. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct LocationService {
    inner: Arc<LocationServiceInner>,
}

fn begin(counter: &AtomicU64) -> u64 {
    counter.fetch_add(1, Ordering::SeqCst) + 1
}

fn is_current(counter: &AtomicU64, token: u64) -> bool {
    counter.load(Ordering::SeqCst) == token
}

impl LocationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        local: LocalStore,
        profiles: Arc<dyn ProfileStore>,
        ip: Arc<dyn IpLocate>,
        geocoder: Arc<dyn ReverseGeocode>,
        pincodes: Arc<dyn PincodeDirectory>,
        delivery: DeliveryService,
        geolocation: Arc<dyn Geolocation>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(LocationServiceInner {
                local,
                profiles,
                ip,
                geocoder,
                pincodes,
                delivery,
                geolocation,
                user_id,
                state: RwLock::new(LocationState::default()),
                detect_generation: AtomicU64::new(0),
                pincode_generation: AtomicU64::new(0),
            }),
        }
    }

    // ─── Startup Resolution ──────────────────────────────────────

    /// Resolve the startup location. Returns once a cached or profile
    /// location is adopted; otherwise IP detection continues in the
    /// background and this call returns immediately.
    pub async fn initialize(&self) {
        // 1. Prior-session cache wins outright.
        if let Some(cached) = self.inner.local.get_json::<UserLocation>(keys::USER_LOCATION) {
            tracing::info!(city = %cached.city, "Restored location from local cache");
            let mut state = self.write_state();
            state.location = Some(cached);
            state.source = Some(LocationSource::Stored);
            return;
        }

        // 2. Authenticated profile short-circuits IP detection.
        if let Some(user_id) = &self.inner.user_id {
            match self.inner.profiles.location(user_id).await {
                Ok(Some(profile)) if !profile.city.is_empty() => {
                    tracing::info!(city = %profile.city, "Adopted location from profile");
                    self.adopt(profile, LocationSource::Profile);
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Profile location fetch failed");
                }
            }
        }

        // 3. Silent background IP detection; never surfaces an error.
        let service = self.clone();
        let token = begin(&self.inner.detect_generation);
        tokio::spawn(async move {
            service.detect_by_ip(token).await;
        });
    }

    /// IP-based detection with the hardcoded default as last resort.
    async fn detect_by_ip(&self, token: u64) {
        let located = match self.inner.ip.locate().await {
            Ok(location) => {
                tracing::info!(city = %location.city, "Location detected by IP");
                location
            }
            Err(e) => {
                tracing::warn!(error = %e, "IP detection failed, using default location");
                UserLocation::default_fallback()
            }
        };

        if is_current(&self.inner.detect_generation, token) {
            self.adopt(located, LocationSource::Ip);
        } else {
            tracing::debug!("Discarding superseded IP detection result");
        }
    }

    // ─── Public Operations ───────────────────────────────────────

    /// Current context as shown to the UI.
    pub fn snapshot(&self) -> LocationSnapshot {
        let state = self.read_state();
        LocationSnapshot {
            location: state.location.clone(),
            source: state.source,
            permission: state.permission,
            manual_entry_open: state.manual_entry_open,
            prompt_needed: !self.inner.local.location_asked(),
        }
    }

    /// User-initiated GPS detection.
    ///
    /// Every failure path lands in manual entry; this flow never dead-ends.
    pub async fn request_location(&self) -> LocationSnapshot {
        let token = begin(&self.inner.detect_generation);
        let opts = GeoOptions {
            maximum_age_secs: GEO_MAX_FIX_AGE_SECS,
        };

        let acquired = match tokio::time::timeout(
            GEO_TIMEOUT,
            self.inner.geolocation.current_fix(&opts),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("GPS acquisition timed out");
                Err(GeolocationError::Unavailable)
            }
        };

        match acquired {
            Err(GeolocationError::Denied) => {
                tracing::info!("Geolocation permission denied");
                let mut state = self.write_state();
                state.permission = PermissionStatus::Denied;
                state.manual_entry_open = true;
            }
            Err(GeolocationError::Unavailable) => {
                let mut state = self.write_state();
                state.permission = PermissionStatus::Unavailable;
                state.manual_entry_open = true;
            }
            Ok(fix) => {
                {
                    let mut state = self.write_state();
                    state.permission = PermissionStatus::Granted;
                }
                match self.inner.geocoder.reverse(fix.latitude, fix.longitude).await {
                    None => {
                        // Partial data is not adopted; the user completes
                        // the location by hand.
                        let mut state = self.write_state();
                        state.manual_entry_open = true;
                    }
                    Some(mut location) => {
                        location.latitude = Some(fix.latitude);
                        location.longitude = Some(fix.longitude);
                        if is_current(&self.inner.detect_generation, token) {
                            self.adopt(location, LocationSource::Gps);
                            self.write_state().manual_entry_open = false;
                        } else {
                            tracing::debug!("Discarding superseded GPS result");
                        }
                    }
                }
            }
        }

        self.snapshot()
    }

    /// Adopt a manually entered location and close any open location
    /// dialogs. Supersedes in-flight detection.
    pub fn set_manual_location(&self, location: UserLocation) -> LocationSnapshot {
        begin(&self.inner.detect_generation);
        self.adopt(location, LocationSource::Manual);
        self.write_state().manual_entry_open = false;
        self.inner.local.mark_location_asked();
        self.snapshot()
    }

    /// Delivery estimate for a pincode; degrades to the optimistic
    /// default, never fails.
    pub async fn check_delivery(&self, pincode: &str) -> crate::models::DeliveryInfo {
        self.inner.delivery.check(pincode).await
    }

    /// Look up city/state for a pincode. Returns `Superseded` when a
    /// newer lookup was initiated before this one resolved.
    pub async fn lookup_pincode(&self, pincode: &str) -> PincodeLookupOutcome {
        let token = begin(&self.inner.pincode_generation);
        let result = self.inner.pincodes.lookup(pincode).await;
        if is_current(&self.inner.pincode_generation, token) {
            PincodeLookupOutcome::Completed(result)
        } else {
            tracing::debug!(pincode, "Discarding superseded pincode lookup");
            PincodeLookupOutcome::Superseded
        }
    }

    /// Record that the location prompt has been shown.
    pub fn mark_asked(&self) {
        self.inner.local.mark_location_asked();
    }

    // ─── Internals ───────────────────────────────────────────────

    /// Adopt a location: update state, write the cache, and sync the
    /// profile fire-and-forget when signed in. Last write wins.
    fn adopt(&self, location: UserLocation, source: LocationSource) {
        {
            let mut state = self.write_state();
            state.location = Some(location.clone());
            state.source = Some(source);
        }

        self.inner.local.set_json(keys::USER_LOCATION, &location);

        // Profile-sourced adoptions would write back what was just read.
        if source != LocationSource::Profile {
            if let Some(user_id) = self.inner.user_id.clone() {
                let profiles = Arc::clone(&self.inner.profiles);
                tokio::spawn(async move {
                    if let Err(e) = profiles.save_location(&user_id, &location).await {
                        tracing::warn!(error = %e, "Profile location sync failed");
                    }
                });
            }
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LocationState> {
        self.inner.state.read().expect("location state lock poisoned")
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, LocationState> {
        self.inner.state.write().expect("location state lock poisoned")
    }
}
