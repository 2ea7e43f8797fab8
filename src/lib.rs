// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ogura Location: location & delivery-address service for the Ogura
//! storefront.
//!
//! This crate resolves and holds the user's browsing/delivery context
//! (IP detection, GPS reverse geocoding, PIN code lookup, manual entry),
//! answers delivery-eligibility questions, and manages the saved address
//! book across the hosted platform store and the local guest store.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{FirestoreDb, LocalStore};
use middleware::Session;
use services::{
    AddressBook, AddressRepository, LocalAddressRepository, LocationService,
    RemoteAddressRepository, ReportedGeolocation,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub local: LocalStore,
    pub location: LocationService,
    pub geolocation: Arc<ReportedGeolocation>,
}

impl AppState {
    /// Address book for a request principal. Auth status selects the
    /// backing repository; callers never see which one is active.
    pub fn address_book(&self, session: &Session) -> AddressBook {
        let repo: Arc<dyn AddressRepository> = match &session.user {
            Some(user) => Arc::new(RemoteAddressRepository::new(
                self.db.clone(),
                user.user_id.clone(),
            )),
            None => Arc::new(LocalAddressRepository::new(self.local.clone())),
        };
        AddressBook::new(repo, self.local.clone())
    }
}
