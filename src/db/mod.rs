// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer: the hosted platform store and the localStorage
//! equivalent. The two are independent copies written on every successful
//! mutation; no reconciliation pass runs between them.

pub mod firestore;
pub mod local;

pub use firestore::FirestoreDb;
pub use local::LocalStore;

/// Collection names as constants.
pub mod collections {
    /// User profiles (location fields live here)
    pub const PROFILES: &str = "profiles";
    /// Server-side address book rows
    pub const USER_ADDRESSES: &str = "user_addresses";
    /// Deliverability records keyed by pincode
    pub const DELIVERY_ZONES: &str = "delivery_zones";
}
