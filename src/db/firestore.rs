// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hosted-platform store wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (persisted location fields of signed-in users)
//! - User addresses (the server-side address book)
//! - Delivery zones (deliverability records keyed by pincode)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{DeliveryZone, UserAddress, UserLocation};
use futures_util::{stream, StreamExt};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get the persisted location fields of a user's profile.
    pub async fn get_profile_location(
        &self,
        user_id: &str,
    ) -> Result<Option<UserLocation>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write the location fields of a user's profile.
    pub async fn set_profile_location(
        &self,
        user_id: &str,
        location: &UserLocation,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(user_id)
            .object(location)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Address Operations ──────────────────────────────────────

    /// List a user's saved addresses, default first, then most recent.
    pub async fn list_addresses(&self, user_id: &str) -> Result<Vec<UserAddress>, AppError> {
        let uid = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USER_ADDRESSES)
            .filter(move |q| q.for_all([q.field("user_id").eq(uid.clone())]))
            .order_by([
                (
                    "is_default",
                    firestore::FirestoreQueryDirection::Descending,
                ),
                (
                    "created_at",
                    firestore::FirestoreQueryDirection::Descending,
                ),
            ])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a single address row by id.
    pub async fn get_address(&self, id: &str) -> Result<Option<UserAddress>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_ADDRESSES)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite an address row.
    pub async fn upsert_address(&self, address: &UserAddress) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USER_ADDRESSES)
            .document_id(&address.id)
            .object(address)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete an address row by id.
    pub async fn delete_address(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USER_ADDRESSES)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Clear `is_default` on every address of the user except `keep_id`.
    ///
    /// Uses concurrent writes with a limit to avoid overloading Firestore.
    pub async fn clear_other_defaults(
        &self,
        user_id: &str,
        keep_id: &str,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let defaults: Vec<UserAddress> = self
            .list_addresses(user_id)
            .await?
            .into_iter()
            .filter(|a| a.is_default && a.id != keep_id)
            .collect();

        let results: Vec<Result<(), AppError>> = stream::iter(defaults)
            .map(|mut address| async move {
                address.is_default = false;
                let _: () = client
                    .fluent()
                    .update()
                    .in_col(collections::USER_ADDRESSES)
                    .document_id(&address.id)
                    .object(&address)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect()
            .await;

        for result in results {
            result?;
        }
        Ok(())
    }

    // ─── Delivery Zone Operations ────────────────────────────────

    /// Look up the deliverability record for a pincode, if one exists.
    pub async fn get_delivery_zone(
        &self,
        pincode: &str,
    ) -> Result<Option<DeliveryZone>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::DELIVERY_ZONES)
            .obj()
            .one(pincode)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
