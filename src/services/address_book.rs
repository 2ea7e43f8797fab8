// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The address book: saved delivery addresses behind a repository seam.
//!
//! Signed-in users get the hosted store (rows scoped by user id, default
//! first, newest first); guests get the local guest list (insertion-order
//! prepended). Call sites never know which backing store is active, which
//! is also where a future guest-to-account migration would slot in.
//!
//! The currently selected address is persisted independently in the local
//! store regardless of auth status, and re-validated against the live list
//! whenever it is read.

use crate::db::local::keys;
use crate::db::{FirestoreDb, LocalStore};
use crate::error::AppError;
use crate::models::{AddressInput, AddressSelection, UserAddress};
use crate::time_utils::format_utc_rfc3339;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic suffix so two addresses created in the same millisecond still
/// get distinct ids.
static ADDRESS_SEQ: AtomicU64 = AtomicU64::new(0);

fn generate_address_id(prefix: &str) -> String {
    let seq = ADDRESS_SEQ.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, Utc::now().timestamp_millis(), seq)
}

/// Backing store for saved addresses.
#[async_trait]
pub trait AddressRepository: Send + Sync {
    /// All addresses, most relevant first (default, then newest).
    async fn list(&self) -> Result<Vec<UserAddress>, AppError>;
    async fn insert(&self, input: AddressInput) -> Result<UserAddress, AppError>;
    async fn update(&self, id: &str, input: AddressInput) -> Result<UserAddress, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
    /// Enforce the at-most-one-default invariant around `keep_id`.
    async fn clear_other_defaults(&self, keep_id: &str) -> Result<(), AppError>;
}

// ─── Remote (signed-in) ──────────────────────────────────────────

/// Hosted-store repository scoped to one user.
pub struct RemoteAddressRepository {
    db: FirestoreDb,
    user_id: String,
}

impl RemoteAddressRepository {
    pub fn new(db: FirestoreDb, user_id: String) -> Self {
        Self { db, user_id }
    }
}

#[async_trait]
impl AddressRepository for RemoteAddressRepository {
    async fn list(&self) -> Result<Vec<UserAddress>, AppError> {
        self.db.list_addresses(&self.user_id).await
    }

    async fn insert(&self, input: AddressInput) -> Result<UserAddress, AppError> {
        let now = format_utc_rfc3339(Utc::now());
        let address = UserAddress {
            id: generate_address_id("addr"),
            user_id: Some(self.user_id.clone()),
            full_name: input.full_name,
            mobile: input.mobile,
            pincode: input.pincode,
            address_line: input.address_line,
            city: input.city,
            state: input.state,
            landmark: input.landmark,
            address_type: input.address_type,
            is_default: input.is_default,
            created_at: now.clone(),
            updated_at: now,
        };
        self.db.upsert_address(&address).await?;
        Ok(address)
    }

    async fn update(&self, id: &str, input: AddressInput) -> Result<UserAddress, AppError> {
        let existing = self
            .db
            .get_address(id)
            .await?
            .filter(|a| a.user_id.as_deref() == Some(self.user_id.as_str()))
            .ok_or_else(|| AppError::NotFound(format!("Address {} not found", id)))?;

        let address = UserAddress {
            full_name: input.full_name,
            mobile: input.mobile,
            pincode: input.pincode,
            address_line: input.address_line,
            city: input.city,
            state: input.state,
            landmark: input.landmark,
            address_type: input.address_type,
            is_default: input.is_default,
            updated_at: format_utc_rfc3339(Utc::now()),
            ..existing
        };
        self.db.upsert_address(&address).await?;
        Ok(address)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        self.db.delete_address(id).await
    }

    async fn clear_other_defaults(&self, keep_id: &str) -> Result<(), AppError> {
        self.db.clear_other_defaults(&self.user_id, keep_id).await
    }
}

// ─── Local (guest) ───────────────────────────────────────────────

/// Guest repository over the local store's `ogura_guest_addresses` list.
pub struct LocalAddressRepository {
    local: LocalStore,
}

impl LocalAddressRepository {
    pub fn new(local: LocalStore) -> Self {
        Self { local }
    }

    fn guest_list(&self) -> Vec<UserAddress> {
        self.local.get_json(keys::GUEST_ADDRESSES).unwrap_or_default()
    }

    fn write_guest_list(&self, list: &[UserAddress]) {
        self.local.set_json(keys::GUEST_ADDRESSES, &list);
    }
}

#[async_trait]
impl AddressRepository for LocalAddressRepository {
    async fn list(&self) -> Result<Vec<UserAddress>, AppError> {
        // Stored array order; new entries are prepended on insert.
        Ok(self.guest_list())
    }

    async fn insert(&self, input: AddressInput) -> Result<UserAddress, AppError> {
        let now = format_utc_rfc3339(Utc::now());
        let address = UserAddress {
            id: generate_address_id("guest"),
            user_id: None,
            full_name: input.full_name,
            mobile: input.mobile,
            pincode: input.pincode,
            address_line: input.address_line,
            city: input.city,
            state: input.state,
            landmark: input.landmark,
            address_type: input.address_type,
            is_default: input.is_default,
            created_at: now.clone(),
            updated_at: now,
        };

        let mut list = self.guest_list();
        list.insert(0, address.clone());
        self.write_guest_list(&list);
        Ok(address)
    }

    async fn update(&self, id: &str, input: AddressInput) -> Result<UserAddress, AppError> {
        let mut list = self.guest_list();
        let slot = list
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Address {} not found", id)))?;

        *slot = UserAddress {
            full_name: input.full_name,
            mobile: input.mobile,
            pincode: input.pincode,
            address_line: input.address_line,
            city: input.city,
            state: input.state,
            landmark: input.landmark,
            address_type: input.address_type,
            is_default: input.is_default,
            updated_at: format_utc_rfc3339(Utc::now()),
            ..slot.clone()
        };
        let updated = slot.clone();
        self.write_guest_list(&list);
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut list = self.guest_list();
        list.retain(|a| a.id != id);
        self.write_guest_list(&list);
        Ok(())
    }

    async fn clear_other_defaults(&self, keep_id: &str) -> Result<(), AppError> {
        let mut list = self.guest_list();
        for address in list.iter_mut() {
            if address.id != keep_id {
                address.is_default = false;
            }
        }
        self.write_guest_list(&list);
        Ok(())
    }
}

// ─── Address Book ────────────────────────────────────────────────

/// Uniform address operations plus selection tracking.
pub struct AddressBook {
    repo: Arc<dyn AddressRepository>,
    local: LocalStore,
}

impl AddressBook {
    pub fn new(repo: Arc<dyn AddressRepository>, local: LocalStore) -> Self {
        Self { repo, local }
    }

    pub async fn list(&self) -> Result<Vec<UserAddress>, AppError> {
        self.repo.list().await
    }

    /// The persisted selection, if any. Not validated against the list.
    pub fn selected(&self) -> Option<UserAddress> {
        self.local.get_json(keys::SELECTED_ADDRESS)
    }

    /// Fetch-on-open: load the list and, when nothing valid is selected,
    /// auto-select the default address or the first item.
    pub async fn open_selection(&self) -> Result<AddressSelection, AppError> {
        let addresses = self.repo.list().await?;

        let current = self
            .selected()
            .and_then(|sel| addresses.iter().find(|a| a.id == sel.id).cloned());

        let selected = match current {
            Some(address) => Some(address),
            None => addresses
                .iter()
                .find(|a| a.is_default)
                .or_else(|| addresses.first())
                .cloned(),
        };

        match &selected {
            Some(address) => self.local.set_json(keys::SELECTED_ADDRESS, address),
            None => self.local.remove(keys::SELECTED_ADDRESS),
        }

        Ok(AddressSelection {
            selected_id: selected.map(|a| a.id),
            addresses,
        })
    }

    /// Add an address and select it as current.
    pub async fn add(&self, input: AddressInput) -> Result<UserAddress, AppError> {
        let wants_default = input.is_default;
        let address = self.repo.insert(input).await?;
        if wants_default {
            self.repo.clear_other_defaults(&address.id).await?;
        }
        self.local.set_json(keys::SELECTED_ADDRESS, &address);
        Ok(address)
    }

    /// Update an address. Local state changes only after the backing
    /// store confirms the write.
    pub async fn update(&self, id: &str, input: AddressInput) -> Result<UserAddress, AppError> {
        let address = self.repo.update(id, input).await?;
        if address.is_default {
            self.repo.clear_other_defaults(&address.id).await?;
        }
        if self.selected().map(|s| s.id) == Some(address.id.clone()) {
            self.local.set_json(keys::SELECTED_ADDRESS, &address);
        }
        Ok(address)
    }

    /// Remove an address. If it was the selected one, selection falls
    /// back to the first remaining address (most recently added, or the
    /// default for the hosted ordering), or clears entirely.
    pub async fn remove(&self, id: &str) -> Result<AddressSelection, AppError> {
        self.repo.delete(id).await?;
        let addresses = self.repo.list().await?;

        let selected_id = match self.selected() {
            Some(sel) if sel.id == id => match addresses.first() {
                Some(first) => {
                    self.local.set_json(keys::SELECTED_ADDRESS, first);
                    Some(first.id.clone())
                }
                None => {
                    self.local.remove(keys::SELECTED_ADDRESS);
                    None
                }
            },
            Some(sel) => Some(sel.id),
            None => None,
        };

        Ok(AddressSelection {
            addresses,
            selected_id,
        })
    }

    /// Select an existing address as current.
    pub async fn select(&self, id: &str) -> Result<UserAddress, AppError> {
        let addresses = self.repo.list().await?;
        let address = addresses
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Address {} not found", id)))?;
        self.local.set_json(keys::SELECTED_ADDRESS, &address);
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddressType;

    fn input(name: &str, is_default: bool) -> AddressInput {
        AddressInput {
            full_name: name.to_string(),
            mobile: "9876543210".to_string(),
            pincode: "110001".to_string(),
            address_line: "14 Janpath Lane".to_string(),
            city: "New Delhi".to_string(),
            state: "Delhi".to_string(),
            landmark: None,
            address_type: AddressType::Home,
            is_default,
        }
    }

    fn guest_book(dir: &tempfile::TempDir) -> AddressBook {
        let local = LocalStore::open(dir.path());
        AddressBook::new(Arc::new(LocalAddressRepository::new(local.clone())), local)
    }

    #[tokio::test]
    async fn test_add_grows_list_with_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        let before = book.list().await.unwrap().len();
        let a = book.add(input("Asha", false)).await.unwrap();
        let b = book.add(input("Bina", false)).await.unwrap();
        let c = book.add(input("Chitra", false)).await.unwrap();

        let list = book.list().await.unwrap();
        assert_eq!(list.len(), before + 3);
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_ne!(a.id, c.id);
    }

    #[tokio::test]
    async fn test_insert_prepends() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        book.add(input("Asha", false)).await.unwrap();
        let newest = book.add(input("Bina", false)).await.unwrap();

        let list = book.list().await.unwrap();
        assert_eq!(list[0].id, newest.id);
    }

    #[tokio::test]
    async fn test_guest_addresses_survive_reload_with_same_id() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let book = guest_book(&dir);
            book.add(input("Asha", true)).await.unwrap()
        };

        // Fresh store over the same directory, as after a page reload.
        let book = guest_book(&dir);
        let selection = book.open_selection().await.unwrap();
        assert_eq!(selection.addresses.len(), 1);
        assert_eq!(selection.addresses[0].id, created.id);
        assert!(selection.addresses[0].is_default);
        assert_eq!(selection.selected_id, Some(created.id));
    }

    #[tokio::test]
    async fn test_add_selects_as_current() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);
        let added = book.add(input("Asha", false)).await.unwrap();
        assert_eq!(book.selected().map(|a| a.id), Some(added.id));
    }

    #[tokio::test]
    async fn test_at_most_one_default() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        book.add(input("Asha", true)).await.unwrap();
        let second = book.add(input("Bina", true)).await.unwrap();

        let list = book.list().await.unwrap();
        let defaults: Vec<_> = list.iter().filter(|a| a.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, second.id);
    }

    #[tokio::test]
    async fn test_update_preserves_created_at_and_restamps_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        let added = book.add(input("Asha", false)).await.unwrap();
        let mut changed = input("Asha Verma", false);
        changed.landmark = Some("Opp. metro station".to_string());
        let updated = book.update(&added.id, changed).await.unwrap();

        assert_eq!(updated.id, added.id);
        assert_eq!(updated.created_at, added.created_at);
        assert_eq!(updated.full_name, "Asha Verma");
        assert_eq!(updated.landmark.as_deref(), Some("Opp. metro station"));
    }

    #[tokio::test]
    async fn test_update_missing_address_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);
        let err = book.update("guest-0-0", input("Asha", false)).await;
        assert!(matches!(err, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_only_address_clears_selection() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        let only = book.add(input("Asha", false)).await.unwrap();
        let selection = book.remove(&only.id).await.unwrap();

        assert!(selection.addresses.is_empty());
        assert!(selection.selected_id.is_none());
        assert!(book.selected().is_none());
    }

    #[tokio::test]
    async fn test_delete_selected_falls_back_to_first_remaining() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        let older = book.add(input("Asha", false)).await.unwrap();
        let newer = book.add(input("Bina", false)).await.unwrap();
        let selected = book.add(input("Chitra", false)).await.unwrap();

        let selection = book.remove(&selected.id).await.unwrap();

        // Prepend order: the most recently added remaining address.
        assert_eq!(selection.selected_id, Some(newer.id));
        assert!(selection.addresses.iter().any(|a| a.id == older.id));
    }

    #[tokio::test]
    async fn test_delete_non_selected_leaves_selection_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        let other = book.add(input("Asha", false)).await.unwrap();
        let selected = book.add(input("Bina", false)).await.unwrap();

        let selection = book.remove(&other.id).await.unwrap();
        assert_eq!(selection.selected_id, Some(selected.id.clone()));
        assert_eq!(book.selected().map(|a| a.id), Some(selected.id));
    }

    #[tokio::test]
    async fn test_open_selection_prefers_default_over_first() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        book.add(input("Asha", false)).await.unwrap();
        let fav = book.add(input("Bina", true)).await.unwrap();
        book.add(input("Chitra", false)).await.unwrap();

        // Drop the selection made by add().
        let local = LocalStore::open(dir.path());
        local.remove(keys::SELECTED_ADDRESS);

        let book = guest_book(&dir);
        let selection = book.open_selection().await.unwrap();
        assert_eq!(selection.selected_id, Some(fav.id));
    }

    #[tokio::test]
    async fn test_open_selection_with_no_addresses() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);
        let selection = book.open_selection().await.unwrap();
        assert!(selection.addresses.is_empty());
        assert!(selection.selected_id.is_none());
    }

    #[tokio::test]
    async fn test_stale_selection_invalidated_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let book = guest_book(&dir);

        let kept = book.add(input("Asha", false)).await.unwrap();
        let gone = book.add(input("Bina", false)).await.unwrap();

        // Simulate another tab deleting the selected address out from
        // under the stored selection.
        let repo = LocalAddressRepository::new(LocalStore::open(dir.path()));
        repo.delete(&gone.id).await.unwrap();

        let book = guest_book(&dir);
        let selection = book.open_selection().await.unwrap();
        assert_eq!(selection.selected_id, Some(kept.id));
    }
}
