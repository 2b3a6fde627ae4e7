//! Credential and profile stores.
//!
//! # Design
//! - One mutable cell per store, shared by handle (`Rc<RefCell<_>>`); the client runs on a
//!   single-threaded cooperative scheduler so no locking is needed.
//! - Every mutation is mirrored to the backing [`KeyValueStore`] before returning.
//! - Persisted documents keep the shape earlier client builds wrote
//!   (`{"token": ".."}` and `{"info": {..}}`) so restores need no migration.
//! - Storage failures are logged and never fail the in-memory mutation.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::AccessConfig;
use crate::error::{AccessResult, StorageError};
use crate::model::{Credential, Profile};
use crate::storage::{KeyValueStore, MemoryStore};

#[derive(Serialize, Deserialize)]
struct CredentialDocument {
    #[serde(default)]
    token: String,
}

#[derive(Serialize, Deserialize)]
struct ProfileDocument {
    #[serde(default)]
    info: Value,
}

/// Holds the bearer credential.
#[derive(Clone)]
pub struct CredentialStore {
    key: Rc<str>,
    cell: Rc<RefCell<Option<Credential>>>,
    storage: Rc<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Restore the credential persisted under `key`, starting empty when nothing usable is stored.
    pub fn restore(storage: Rc<dyn KeyValueStore>, key: &str) -> Self {
        let restored = read_document::<CredentialDocument>(storage.as_ref(), key)
            .and_then(|doc| Credential::new(doc.token).ok());
        debug!(key, restored = restored.is_some(), "credential store restored");
        Self {
            key: Rc::from(key),
            cell: Rc::new(RefCell::new(restored)),
            storage,
        }
    }

    /// Current credential, if any.
    #[must_use]
    pub fn get(&self) -> Option<Credential> {
        self.cell.borrow().clone()
    }

    /// Whether a credential is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Replace the credential.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AccessError::Validation`] for blank values; the store is left unchanged.
    pub fn set(&self, raw: impl Into<String>) -> AccessResult<()> {
        let credential = Credential::new(raw)?;
        let document = CredentialDocument {
            token: credential.as_str().to_string(),
        };
        *self.cell.borrow_mut() = Some(credential);
        write_document(self.storage.as_ref(), &self.key, &document);
        Ok(())
    }

    /// Drop the credential. Safe to call repeatedly; returns whether one was present.
    pub fn clear(&self) -> bool {
        let had_value = self.cell.borrow_mut().take().is_some();
        write_document(
            self.storage.as_ref(),
            &self.key,
            &CredentialDocument {
                token: String::new(),
            },
        );
        had_value
    }
}

/// Holds the cached user profile.
#[derive(Clone)]
pub struct ProfileStore {
    key: Rc<str>,
    cell: Rc<RefCell<Option<Profile>>>,
    storage: Rc<dyn KeyValueStore>,
}

impl ProfileStore {
    /// Restore the profile persisted under `key`; an empty `info` object means absent.
    pub fn restore(storage: Rc<dyn KeyValueStore>, key: &str) -> Self {
        let restored = read_document::<ProfileDocument>(storage.as_ref(), key).and_then(|doc| {
            if doc.info.as_object().is_none_or(Map::is_empty) {
                return None;
            }
            serde_json::from_value::<Profile>(doc.info)
                .inspect_err(|err| warn!(key, error = %err, "discarding unreadable stored profile"))
                .ok()
        });
        Self {
            key: Rc::from(key),
            cell: Rc::new(RefCell::new(restored)),
            storage,
        }
    }

    /// Cached profile, if any.
    #[must_use]
    pub fn get(&self) -> Option<Profile> {
        self.cell.borrow().clone()
    }

    /// Whether a profile is cached.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.cell.borrow().is_some()
    }

    /// Cache a freshly fetched profile.
    pub fn set(&self, profile: Profile) {
        let info = serde_json::to_value(&profile).unwrap_or_else(|_| Value::Object(Map::new()));
        *self.cell.borrow_mut() = Some(profile);
        write_document(self.storage.as_ref(), &self.key, &ProfileDocument { info });
    }

    /// Drop the cached profile. Safe to call repeatedly.
    pub fn clear(&self) -> bool {
        let had_value = self.cell.borrow_mut().take().is_some();
        write_document(
            self.storage.as_ref(),
            &self.key,
            &ProfileDocument {
                info: Value::Object(Map::new()),
            },
        );
        had_value
    }
}

/// Explicit session context handed to the pipeline and guard.
#[derive(Clone)]
pub struct Session {
    credential: CredentialStore,
    profile: ProfileStore,
}

impl Session {
    /// Restore both stores from `storage` using the keys in `config`.
    pub fn restore(storage: Rc<dyn KeyValueStore>, config: &AccessConfig) -> Self {
        Self {
            credential: CredentialStore::restore(Rc::clone(&storage), &config.credential_key),
            profile: ProfileStore::restore(storage, &config.profile_key),
        }
    }

    /// Empty session backed by memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::restore(Rc::new(MemoryStore::new()), &AccessConfig::default())
    }

    /// Credential store handle.
    #[must_use]
    pub const fn credential(&self) -> &CredentialStore {
        &self.credential
    }

    /// Profile store handle.
    #[must_use]
    pub const fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    /// Whether a credential is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_present()
    }

    /// Start a session with a freshly issued token. Any profile cached for a
    /// previous identity is dropped so the guard fetches the new one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AccessError::Validation`] for blank tokens.
    pub fn establish(&self, token: impl Into<String>) -> AccessResult<()> {
        self.credential.set(token)?;
        self.profile.clear();
        info!("session established");
        Ok(())
    }

    /// Logout: clear the credential, then the profile. Idempotent.
    pub fn end(&self) {
        let had_credential = self.credential.clear();
        self.profile.clear();
        if had_credential {
            info!("session ended");
        }
    }
}

fn read_document<T: for<'de> Deserialize<'de>>(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Option<T> {
    let raw = match storage.load(key) {
        Ok(raw) => raw?,
        Err(err) => {
            log_storage_error("load", key, &err);
            return None;
        }
    };
    serde_json::from_str(&raw)
        .inspect_err(|err| warn!(key, error = %err, "stored session document is not valid JSON"))
        .ok()
}

fn write_document<T: Serialize>(storage: &dyn KeyValueStore, key: &str, document: &T) {
    let text = match serde_json::to_string(document) {
        Ok(text) => text,
        Err(err) => {
            warn!(key, error = %err, "failed to encode session document");
            return;
        }
    };
    if let Err(err) = storage.save(key, &text) {
        log_storage_error("save", key, &err);
    }
}

fn log_storage_error(operation: &'static str, key: &str, err: &StorageError) {
    warn!(operation, key, error = %err, "session storage operation failed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use anyhow::Result;

    fn shared_store() -> Rc<MemoryStore> {
        Rc::new(MemoryStore::new())
    }

    #[test]
    fn credential_mutations_write_through() -> Result<()> {
        let backing = shared_store();
        let store = CredentialStore::restore(backing.clone(), "token");
        store.set("abc")?;
        assert_eq!(backing.load("token")?.as_deref(), Some(r#"{"token":"abc"}"#));

        let reloaded = CredentialStore::restore(backing.clone(), "token");
        assert_eq!(reloaded.get().map(|c| c.as_str().to_string()).as_deref(), Some("abc"));

        assert!(store.clear());
        assert_eq!(backing.load("token")?.as_deref(), Some(r#"{"token":""}"#));
        assert!(!CredentialStore::restore(backing, "token").is_present());
        Ok(())
    }

    #[test]
    fn blank_credentials_are_rejected_without_side_effects() -> Result<()> {
        let backing = shared_store();
        let store = CredentialStore::restore(backing.clone(), "token");
        store.set("abc")?;
        assert!(store.set("  ").is_err());
        assert!(store.is_present());
        assert_eq!(backing.load("token")?.as_deref(), Some(r#"{"token":"abc"}"#));
        Ok(())
    }

    #[test]
    fn logout_twice_leaves_store_empty() -> Result<()> {
        let session = Session::in_memory();
        session.credential().set("abc")?;
        session.profile().set(Profile::new(1, Role::Author));
        session.end();
        assert!(!session.is_authenticated());
        assert!(!session.profile().is_present());
        session.end();
        assert!(!session.is_authenticated());
        assert!(!session.profile().is_present());
        Ok(())
    }

    #[test]
    fn establish_drops_profile_of_previous_identity() -> Result<()> {
        let session = Session::in_memory();
        session.establish("first")?;
        session.profile().set(Profile::new(1, Role::Author));
        session.establish("second")?;
        assert!(session.is_authenticated());
        assert!(!session.profile().is_present());
        Ok(())
    }

    #[test]
    fn profile_restores_verbatim_and_treats_empty_info_as_absent() -> Result<()> {
        let backing = Rc::new(MemoryStore::with_entries([
            ("token", r#"{"token":"Bearer xyz"}"#),
            ("userInfo", r#"{"info":{"id":4,"role":1,"nickname":"ink"}}"#),
        ]));
        let session = Session::restore(backing.clone(), &AccessConfig::default());
        assert!(session.is_authenticated());
        let profile = session.profile().get();
        assert_eq!(profile.as_ref().map(|p| p.role), Some(Role::Author));
        assert_eq!(profile.map(|p| p.display_name()).as_deref(), Some("ink"));

        session.profile().clear();
        assert_eq!(backing.load("userInfo")?.as_deref(), Some(r#"{"info":{}}"#));
        let reloaded = Session::restore(backing, &AccessConfig::default());
        assert!(!reloaded.profile().is_present());
        Ok(())
    }

    #[test]
    fn corrupt_documents_restore_as_empty() {
        let backing = Rc::new(MemoryStore::with_entries([
            ("token", "not json"),
            ("userInfo", r#"{"info":{"id":"x"}}"#),
        ]));
        let session = Session::restore(backing, &AccessConfig::default());
        assert!(!session.is_authenticated());
        assert!(!session.profile().is_present());
    }
}
