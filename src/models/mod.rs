// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod address;
pub mod delivery;
pub mod location;

pub use address::{AddressInput, AddressSelection, AddressType, UserAddress};
pub use delivery::{DeliveryInfo, DeliveryZone};
pub use location::{DeviceFix, LocationSource, PermissionStatus, UserLocation};
