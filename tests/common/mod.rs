// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use ogura_location::config::Config;
use ogura_location::db::{FirestoreDb, LocalStore};
use ogura_location::routes::create_router;
use ogura_location::services::{
    DeliveryService, HttpIpLocator, HttpPincodeDirectory, LocationService, NominatimClient,
    ReportedGeolocation,
};
use ogura_location::AppState;
use std::sync::Arc;

/// A fully wired offline app: mock hosted store, temp-dir local store,
/// remote endpoints pointed at an unbound port so calls fail fast.
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    _dir: tempfile::TempDir,
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a guest test app.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with_user(None)
}

/// Create a test app, optionally serving a signed-in user.
#[allow(dead_code)]
pub fn create_test_app_with_user(user_id: Option<String>) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = Config::test_default();
    config.data_dir = dir.path().to_path_buf();

    let db = test_db_offline();
    let local = LocalStore::open(&config.data_dir);
    let geolocation = Arc::new(ReportedGeolocation::new());

    let location = LocationService::new(
        local.clone(),
        Arc::new(db.clone()),
        Arc::new(HttpIpLocator::new(config.ip_lookup_url.clone())),
        Arc::new(NominatimClient::new(config.geocoder_url.clone())),
        Arc::new(HttpPincodeDirectory::new(config.pincode_lookup_url.clone())),
        DeliveryService::new(db.clone()),
        geolocation.clone(),
        user_id,
    );

    let state = Arc::new(AppState {
        config,
        db,
        local,
        location,
        geolocation,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        _dir: dir,
    }
}

/// Create a session JWT signed with the test key.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    ogura_location::middleware::auth::create_session_jwt(user_id, signing_key)
        .expect("jwt creation")
}

/// Drain a response body into JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("body json")
}
