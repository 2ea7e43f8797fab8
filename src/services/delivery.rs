// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Delivery eligibility checks.
//!
//! A record miss and a lookup error are treated identically: both yield
//! the optimistic default estimate. Missing delivery-zone data must never
//! block a purchase path.

use crate::db::FirestoreDb;
use crate::models::DeliveryInfo;
use dashmap::DashMap;
use std::sync::Arc;

/// Delivery-zone checker with an in-memory memo for found rows.
#[derive(Clone)]
pub struct DeliveryService {
    db: FirestoreDb,
    cache: Arc<DashMap<String, DeliveryInfo>>,
}

impl DeliveryService {
    pub fn new(db: FirestoreDb) -> Self {
        Self {
            db,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Delivery estimate for a pincode. Infallible by design.
    pub async fn check(&self, pincode: &str) -> DeliveryInfo {
        if let Some(cached) = self.cache.get(pincode) {
            return *cached;
        }

        match self.db.get_delivery_zone(pincode).await {
            Ok(Some(zone)) => {
                let info = DeliveryInfo::from(zone);
                self.cache.insert(pincode.to_string(), info);
                info
            }
            Ok(None) => {
                tracing::debug!(pincode, "No delivery zone record, using default estimate");
                DeliveryInfo::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, pincode, "Delivery zone lookup failed, using default estimate");
                DeliveryInfo::default()
            }
        }
    }

    #[cfg(test)]
    fn seed(&self, pincode: &str, info: DeliveryInfo) {
        self.cache.insert(pincode.to_string(), info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_error_yields_optimistic_default() {
        // Offline mock: every DB call errors, so the default applies.
        let service = DeliveryService::new(FirestoreDb::new_mock());
        let info = service.check("560001").await;
        assert_eq!(info, DeliveryInfo::default());
    }

    #[tokio::test]
    async fn test_default_is_not_memoized() {
        let service = DeliveryService::new(FirestoreDb::new_mock());
        let _ = service.check("560001").await;
        assert!(service.cache.is_empty());
    }

    #[tokio::test]
    async fn test_memoized_row_short_circuits_lookup() {
        let service = DeliveryService::new(FirestoreDb::new_mock());
        let express = DeliveryInfo {
            is_deliverable: true,
            delivery_days: 2,
            express_available: true,
        };
        service.seed("110001", express);

        // Mock DB would error; the memo answers instead.
        assert_eq!(service.check("110001").await, express);
    }
}
