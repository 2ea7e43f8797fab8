// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved delivery addresses and the validated form payload.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// A saved delivery address.
///
/// Stored server-side (scoped by `user_id`) for signed-in users, or in the
/// guest list of the local store with a locally generated id. Timestamps
/// are RFC3339 strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserAddress {
    pub id: String,
    /// Absent for guest addresses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub full_name: String,
    /// 10 digits
    pub mobile: String,
    /// 6 digits
    pub pincode: String,
    pub address_line: String,
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    pub address_type: AddressType,
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum AddressType {
    Home,
    Work,
}

impl Default for AddressType {
    fn default() -> Self {
        Self::Home
    }
}

/// Address form payload, validated before any network call.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddressInput {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub full_name: String,
    #[validate(
        length(equal = 10, message = "Mobile number must be 10 digits"),
        custom(function = validate_digits)
    )]
    pub mobile: String,
    #[validate(
        length(equal = 6, message = "PIN code must be 6 digits"),
        custom(function = validate_digits)
    )]
    pub pincode: String,
    #[validate(length(min = 1, max = 500, message = "Address is required"))]
    pub address_line: String,
    #[validate(length(min = 1, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 1, max = 100, message = "State is required"))]
    pub state: String,
    #[validate(length(max = 200, message = "Landmark is too long"))]
    pub landmark: Option<String>,
    #[serde(default)]
    pub address_type: AddressType,
    #[serde(default)]
    pub is_default: bool,
}

/// Numeric-only check shared by mobile and pincode fields.
fn validate_digits(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("digits");
        err.message = Some("Must contain only digits".into());
        Err(err)
    }
}

/// The address list plus the current selection, as shown by the address
/// selection surface.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AddressSelection {
    pub addresses: Vec<UserAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<String>,
}
