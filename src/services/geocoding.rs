// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reverse geocoding: GPS coordinates to a human-readable address.
//!
//! Address providers vary wildly in locale granularity, so the city field
//! is extracted through a fallback chain. Any failure yields `None`; the
//! caller routes the user to manual entry instead of adopting partial
//! data.

use crate::models::UserLocation;
use async_trait::async_trait;
use serde::Deserialize;

/// A reverse-geocoding source.
#[async_trait]
pub trait ReverseGeocode: Send + Sync {
    /// Best-effort location for the coordinates, or `None`.
    async fn reverse(&self, latitude: f64, longitude: f64) -> Option<UserLocation>;
}

/// Nominatim-style reverse geocoding client.
#[derive(Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

/// Free-form address object returned by the provider.
#[derive(Debug, Default, Deserialize)]
struct GeocodeAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    suburb: Option<String>,
    county: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    address: Option<GeocodeAddress>,
}

/// Pick the city through the provider's granularity ladder:
/// city → town → village → suburb → county, first non-empty wins.
fn extract_location(address: GeocodeAddress, latitude: f64, longitude: f64) -> UserLocation {
    let city = [
        address.city,
        address.town,
        address.village,
        address.suburb,
        address.county,
    ]
    .into_iter()
    .flatten()
    .find(|c| !c.is_empty())
    .unwrap_or_default();

    UserLocation {
        city,
        state: address.state.unwrap_or_default(),
        country: address.country.unwrap_or_default(),
        pincode: address.postcode.unwrap_or_default(),
        latitude: Some(latitude),
        longitude: Some(longitude),
    }
}

impl NominatimClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("ogura-storefront/0.1")
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ReverseGeocode for NominatimClient {
    async fn reverse(&self, latitude: f64, longitude: f64) -> Option<UserLocation> {
        let url = format!("{}/reverse", self.base_url);

        let response = match self
            .http
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "jsonv2".to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocode request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Reverse geocode returned error status");
            return None;
        }

        let body: GeocodeResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocode parse error");
                return None;
            }
        };

        let address = body.address?;
        Some(extract_location(address, latitude, longitude))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_taken_directly() {
        let address: GeocodeAddress = serde_json::from_str(
            r#"{"city": "New Delhi", "state": "Delhi", "postcode": "110001", "country": "India"}"#,
        )
        .unwrap();
        let loc = extract_location(address, 28.61, 77.21);
        assert_eq!(loc.city, "New Delhi");
        assert_eq!(loc.state, "Delhi");
        assert_eq!(loc.pincode, "110001");
        assert_eq!(loc.latitude, Some(28.61));
    }

    #[test]
    fn test_town_used_when_no_city() {
        let address: GeocodeAddress =
            serde_json::from_str(r#"{"town": "Manali", "state": "Himachal Pradesh"}"#).unwrap();
        let loc = extract_location(address, 32.24, 77.19);
        assert_eq!(loc.city, "Manali");
    }

    #[test]
    fn test_fallback_order_village_before_suburb() {
        let address: GeocodeAddress =
            serde_json::from_str(r#"{"village": "Ziro", "suburb": "Old Town"}"#).unwrap();
        let loc = extract_location(address, 27.54, 93.82);
        assert_eq!(loc.city, "Ziro");
    }

    #[test]
    fn test_county_is_last_resort() {
        let address: GeocodeAddress = serde_json::from_str(r#"{"county": "Kangra"}"#).unwrap();
        let loc = extract_location(address, 32.1, 76.27);
        assert_eq!(loc.city, "Kangra");
    }

    #[test]
    fn test_empty_candidates_skipped() {
        let address: GeocodeAddress =
            serde_json::from_str(r#"{"city": "", "town": "Alleppey"}"#).unwrap();
        let loc = extract_location(address, 9.49, 76.33);
        assert_eq!(loc.city, "Alleppey");
    }

    #[test]
    fn test_missing_fields_become_empty_strings() {
        let address: GeocodeAddress = serde_json::from_str(r#"{}"#).unwrap();
        let loc = extract_location(address, 10.0, 76.0);
        assert!(loc.city.is_empty());
        assert!(loc.state.is_empty());
        assert!(loc.pincode.is_empty());
    }
}
