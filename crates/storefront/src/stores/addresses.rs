//! Saved delivery addresses.
//!
//! At most one address is the default. Saving an address as default clears
//! the flag on every other address.

use thiserror::Error;
use tokio::sync::watch;
use tracing::instrument;
use uuid::Uuid;

use farmstand_core::{Address, AddressDraft, AddressId};

use super::Persisted;
use crate::storage::{Storage, keys};

/// Errors from address book operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is blank.
    #[error("please fill in the {0}")]
    MissingField(&'static str),

    /// No address with this id.
    #[error("address not found: {0}")]
    NotFound(AddressId),
}

/// Addresses persisted under `addresses`.
#[derive(Debug)]
pub struct AddressBook {
    inner: Persisted<Vec<Address>>,
}

impl AddressBook {
    /// Load saved addresses from local storage.
    ///
    /// If the stored blob flags several defaults, only the first keeps the
    /// flag and the repaired list is written back.
    pub async fn load(storage: Storage) -> Self {
        let inner: Persisted<Vec<Address>> = Persisted::load(storage, keys::ADDRESSES).await;
        inner.modify(|all: &mut Vec<Address>| {
            let mut seen_default = false;
            let mut changed = false;
            for address in all.iter_mut().filter(|address| address.is_default) {
                if seen_default {
                    address.is_default = false;
                    changed = true;
                }
                seen_default = true;
            }
            changed
        });
        Self { inner }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Address>> {
        self.inner.subscribe()
    }

    #[must_use]
    pub fn addresses(&self) -> Vec<Address> {
        self.inner.read(Clone::clone)
    }

    /// The address flagged as default, if any.
    #[must_use]
    pub fn default_address(&self) -> Option<Address> {
        self.inner
            .read(|all| all.iter().find(|address| address.is_default).cloned())
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` if a required field is blank.
    #[instrument(skip(self, draft))]
    pub fn add(&self, draft: AddressDraft) -> Result<Address, AddressError> {
        if let Some(field) = draft.first_blank_field() {
            return Err(AddressError::MissingField(field));
        }
        let address = Address::from_draft(AddressId::new(Uuid::new_v4().to_string()), draft);

        self.inner.modify(|all| {
            if address.is_default {
                clear_default(all);
            }
            all.push(address.clone());
            true
        });
        tracing::debug!(address_id = %address.id, "Address added");
        Ok(address)
    }

    /// Replace the fields of an existing address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` for a blank field, or
    /// `AddressError::NotFound` for an unknown id.
    #[instrument(skip(self, draft))]
    pub fn update(&self, id: &AddressId, draft: AddressDraft) -> Result<Address, AddressError> {
        if let Some(field) = draft.first_blank_field() {
            return Err(AddressError::MissingField(field));
        }
        let updated = Address::from_draft(id.clone(), draft);

        let mut found = false;
        self.inner.modify(|all| {
            if !all.iter().any(|address| &address.id == id) {
                return false;
            }
            found = true;
            if updated.is_default {
                clear_default(all);
            }
            for address in all.iter_mut().filter(|address| &address.id == id) {
                *address = updated.clone();
            }
            true
        });

        if found {
            Ok(updated)
        } else {
            Err(AddressError::NotFound(id.clone()))
        }
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &AddressId) -> Result<(), AddressError> {
        let removed = self.inner.modify(|all| {
            let before = all.len();
            all.retain(|address| &address.id != id);
            all.len() != before
        });
        if removed {
            Ok(())
        } else {
            Err(AddressError::NotFound(id.clone()))
        }
    }

    /// Make `id` the only default address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for an unknown id.
    #[instrument(skip(self))]
    pub fn set_default(&self, id: &AddressId) -> Result<(), AddressError> {
        let mut found = false;
        self.inner.modify(|all| {
            found = all.iter().any(|address| &address.id == id);
            if !found {
                return false;
            }
            for address in all.iter_mut() {
                address.is_default = &address.id == id;
            }
            true
        });
        if found {
            Ok(())
        } else {
            Err(AddressError::NotFound(id.clone()))
        }
    }
}

fn clear_default(all: &mut [Address]) {
    for address in all {
        address.is_default = false;
    }
}
