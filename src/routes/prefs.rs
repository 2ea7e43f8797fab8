// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storefront preference routes: recent searches and try-on model
//! favorites. Both live in the local store under their legacy keys.

use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/search/recent", get(recent_searches))
        .route("/api/search/recent", post(push_recent_search))
        .route("/api/favorites/models", get(model_favorites))
        .route("/api/favorites/models/{id}/toggle", post(toggle_model_favorite))
}

async fn recent_searches(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.local.recent_searches())
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

/// Record a search; returns the updated list (capped at five).
async fn push_recent_search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchQuery>,
) -> Json<Vec<String>> {
    state.local.push_recent_search(&body.query);
    Json(state.local.recent_searches())
}

async fn model_favorites(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.local.model_favorites())
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub favorite: bool,
}

async fn toggle_model_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<ToggleResponse> {
    Json(ToggleResponse {
        favorite: state.local.toggle_model_favorite(&id),
    })
}
