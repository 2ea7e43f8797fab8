// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ogura Location API Server
//!
//! Serves the storefront's location & delivery-address API: startup
//! location resolution, GPS/pincode lookups, delivery estimates, and the
//! saved address book.

use ogura_location::{
    config::Config,
    db::{FirestoreDb, LocalStore},
    middleware::auth::decode_session,
    services::{
        DeliveryService, HttpIpLocator, HttpPincodeDirectory, LocationService, NominatimClient,
        ReportedGeolocation,
    },
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Ogura Location API");

    // Hosted platform store. A failed connection degrades to offline
    // mode: profile and address reads error per-call, and delivery
    // checks fall back to their optimistic default.
    let db = match FirestoreDb::new(&config.gcp_project_id).await {
        Ok(db) => db,
        Err(e) => {
            tracing::warn!(error = %e, "Hosted store unavailable, running offline");
            FirestoreDb::new_mock()
        }
    };

    // Local key/value store (guest addresses, cached location, prefs)
    let local = LocalStore::open(&config.data_dir);
    tracing::info!(dir = %config.data_dir.display(), "Local store opened");

    // Session for the user this process serves, if signed in
    let user_id = config
        .session_token
        .as_deref()
        .and_then(|token| decode_session(token, &config.jwt_signing_key))
        .map(|user| user.user_id);
    match &user_id {
        Some(id) => tracing::info!(user_id = %id, "Running with a signed-in session"),
        None => tracing::info!("Running as guest"),
    }

    // External collaborators
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

    // Resolve the startup location (cache → profile → background IP)
    location.initialize().await;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        local,
        location,
        geolocation,
    });

    // Build router
    let app = ogura_location::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ogura_location=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
