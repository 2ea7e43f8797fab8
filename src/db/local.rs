// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local key/value store, the process's equivalent of the browser's
//! localStorage.
//!
//! One JSON document on disk, rewritten atomically (temp file + rename) on
//! every mutation. Key names are bit-exact with what the storefront web
//! client persists, so a store written by either side reads back in the
//! other. Reads are infallible; write failures are logged and swallowed,
//! since cache persistence never surfaces an error to the user flow.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Storage key names. Bit-exact for compatibility with the web client.
pub mod keys {
    /// JSON `UserLocation`
    pub const USER_LOCATION: &str = "ogura_user_location";
    /// JSON `UserAddress`
    pub const SELECTED_ADDRESS: &str = "ogura_selected_address";
    /// JSON array of `UserAddress`
    pub const GUEST_ADDRESSES: &str = "ogura_guest_addresses";
    /// JSON array of strings, max 5
    pub const RECENT_SEARCHES: &str = "ogura_recent_searches";
    /// JSON array of string ids
    pub const MODEL_FAVORITES: &str = "modelFavorites";
    /// String `"true"` sentinel
    pub const LOCATION_ASKED: &str = "ogura_location_asked";
}

const STORE_FILE_NAME: &str = "local_storage.json";
const MAX_RECENT_SEARCHES: usize = 5;

struct LocalInner {
    path: PathBuf,
    map: RwLock<HashMap<String, serde_json::Value>>,
}

/// File-backed key/value store.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<LocalInner>,
}

impl LocalStore {
    /// Open (or create) the store under `data_dir`.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        let dir: PathBuf = data_dir.into();
        let path = dir.join(STORE_FILE_NAME);

        let map = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %path.display(), "Local store unreadable, starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            inner: Arc::new(LocalInner {
                path,
                map: RwLock::new(map),
            }),
        }
    }

    /// Read a key, deserializing into `T`. Missing or mismatched values
    /// read as `None`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let map = self.inner.map.read().expect("local store lock poisoned");
        map.get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Write a key and persist the store.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, key, "Failed to serialize local store value");
                return;
            }
        };

        {
            let mut map = self.inner.map.write().expect("local store lock poisoned");
            map.insert(key.to_string(), serialized);
        }
        self.persist();
    }

    /// Remove a key and persist the store.
    pub fn remove(&self, key: &str) {
        let removed = {
            let mut map = self.inner.map.write().expect("local store lock poisoned");
            map.remove(key).is_some()
        };
        if removed {
            self.persist();
        }
    }

    /// Rewrite the backing file atomically: write a sibling temp file,
    /// then rename over the original.
    fn persist(&self) {
        let snapshot = {
            let map = self.inner.map.read().expect("local store lock poisoned");
            match serde_json::to_string_pretty(&*map) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to serialize local store");
                    return;
                }
            }
        };

        let path = &self.inner.path;
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(error = %e, "Failed to create local store directory");
                return;
            }
        }

        let tmp = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, snapshot).and_then(|_| fs::rename(&tmp, path)) {
            tracing::warn!(error = %e, path = %path.display(), "Failed to persist local store");
        }
    }

    // ─── Location Sentinel ───────────────────────────────────────

    /// Whether the location prompt has already been shown.
    pub fn location_asked(&self) -> bool {
        self.get_json::<String>(keys::LOCATION_ASKED)
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// Record that the location prompt has been shown.
    pub fn mark_location_asked(&self) {
        self.set_json(keys::LOCATION_ASKED, &"true");
    }

    // ─── Recent Searches ─────────────────────────────────────────

    /// Most recent search queries, newest first.
    pub fn recent_searches(&self) -> Vec<String> {
        self.get_json(keys::RECENT_SEARCHES).unwrap_or_default()
    }

    /// Push a query to the front of the recent list, de-duplicating and
    /// capping at five entries.
    pub fn push_recent_search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let mut searches = self.recent_searches();
        searches.retain(|s| !s.eq_ignore_ascii_case(query));
        searches.insert(0, query.to_string());
        searches.truncate(MAX_RECENT_SEARCHES);
        self.set_json(keys::RECENT_SEARCHES, &searches);
    }

    // ─── Model Favorites ─────────────────────────────────────────

    /// Ids of favorited try-on models.
    pub fn model_favorites(&self) -> Vec<String> {
        self.get_json(keys::MODEL_FAVORITES).unwrap_or_default()
    }

    /// Toggle a model id in the favorites list. Returns `true` when the
    /// id is a favorite after the call.
    pub fn toggle_model_favorite(&self, id: &str) -> bool {
        let mut favorites = self.model_favorites();
        let now_favorite = if let Some(pos) = favorites.iter().position(|f| f == id) {
            favorites.remove(pos);
            false
        } else {
            favorites.push(id.to_string());
            true
        };
        self.set_json(keys::MODEL_FAVORITES, &favorites);
        now_favorite
    }
}
