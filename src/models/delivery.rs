// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Delivery-zone records and the derived delivery estimate.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A deliverability row in the hosted store, keyed by pincode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryZone {
    pub pincode: String,
    pub is_deliverable: bool,
    pub delivery_days: i64,
    pub express_available: bool,
}

/// Delivery estimate shown at checkout. Derived and ephemeral; never
/// persisted. The default is deliberately optimistic so a missing zone
/// row never blocks a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeliveryInfo {
    pub is_deliverable: bool,
    pub delivery_days: i64,
    pub express_available: bool,
}

impl Default for DeliveryInfo {
    fn default() -> Self {
        Self {
            is_deliverable: true,
            delivery_days: 7,
            express_available: false,
        }
    }
}

impl From<DeliveryZone> for DeliveryInfo {
    fn from(zone: DeliveryZone) -> Self {
        Self {
            is_deliverable: zone.is_deliverable,
            delivery_days: zone.delivery_days,
            express_available: zone.express_available,
        }
    }
}
