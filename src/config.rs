// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything non-sensitive has a development default so the service can
//! come up against the hosted emulator with nothing but a signing key set.

use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storefront origin allowed by CORS
    pub frontend_url: String,
    /// GCP project ID backing the hosted platform store
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Directory holding the local (guest) key/value store
    pub data_dir: PathBuf,
    /// IP-geolocation function endpoint
    pub ip_lookup_url: String,
    /// Reverse-geocoding API base URL
    pub geocoder_url: String,
    /// Pincode-lookup function endpoint
    pub pincode_lookup_url: String,
    /// HS256 key used to verify storefront session JWTs
    pub jwt_signing_key: Vec<u8>,
    /// Session JWT for the user this process serves, if signed in
    pub session_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            data_dir: env::var("OGURA_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".ogura")),
            ip_lookup_url: env::var("IP_LOOKUP_URL")
                .unwrap_or_else(|_| "https://functions.ogura.shop/ip-location".to_string()),
            geocoder_url: env::var("GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            pincode_lookup_url: env::var("PINCODE_LOOKUP_URL")
                .unwrap_or_else(|_| "https://functions.ogura.shop/pincode-lookup".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            session_token: env::var("SESSION_TOKEN").ok().filter(|t| !t.is_empty()),
        })
    }

    /// Default config for tests. Points all remote endpoints at an unbound
    /// local port so any accidental network call fails fast.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            data_dir: std::env::temp_dir().join("ogura-location-tests"),
            ip_lookup_url: "http://127.0.0.1:1/ip-location".to_string(),
            geocoder_url: "http://127.0.0.1:1".to_string(),
            pincode_lookup_url: "http://127.0.0.1:1/pincode-lookup".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            session_token: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
