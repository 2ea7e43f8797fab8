// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Address book routes.
//!
//! The request principal (session or guest) picks the backing repository;
//! handlers only see the uniform `AddressBook` interface.

use crate::error::Result;
use crate::middleware::Session;
use crate::models::{AddressInput, AddressSelection, UserAddress};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/addresses", get(list_addresses))
        .route("/api/addresses", post(create_address))
        .route("/api/addresses/{id}", put(update_address))
        .route("/api/addresses/{id}", delete(delete_address))
        .route("/api/addresses/{id}/select", post(select_address))
}

/// Fetch-on-open: the address selection surface loads lazily and
/// auto-selects the default (or first) address when nothing is selected.
async fn list_addresses(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
) -> Result<Json<AddressSelection>> {
    let book = state.address_book(&session);
    Ok(Json(book.open_selection().await?))
}

/// Add a new address and select it as current.
async fn create_address(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Json(input): Json<AddressInput>,
) -> Result<(StatusCode, Json<UserAddress>)> {
    input.validate()?;
    let book = state.address_book(&session);
    let address = book.add(input).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// Update an existing address.
async fn update_address(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(input): Json<AddressInput>,
) -> Result<Json<UserAddress>> {
    input.validate()?;
    let book = state.address_book(&session);
    Ok(Json(book.update(&id, input).await?))
}

/// Remove an address; returns the remaining list and the selection after
/// fallback.
async fn delete_address(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<AddressSelection>> {
    let book = state.address_book(&session);
    Ok(Json(book.remove(&id).await?))
}

/// Select an address as current.
async fn select_address(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> Result<Json<UserAddress>> {
    let book = state.address_book(&session);
    Ok(Json(book.select(&id).await?))
}
