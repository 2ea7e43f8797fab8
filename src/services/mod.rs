// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod address_book;
pub mod delivery;
pub mod geocoding;
pub mod geolocation;
pub mod iplocate;
pub mod location;
pub mod pincode;

pub use address_book::{
    AddressBook, AddressRepository, LocalAddressRepository, RemoteAddressRepository,
};
pub use delivery::DeliveryService;
pub use geocoding::{NominatimClient, ReverseGeocode};
pub use geolocation::{Geolocation, GeolocationError, ReportedGeolocation};
pub use iplocate::{HttpIpLocator, IpLocate};
pub use location::{LocationService, LocationSnapshot, PincodeLookupOutcome, ProfileStore};
pub use pincode::{HttpPincodeDirectory, PincodeDirectory, PincodeResult};
