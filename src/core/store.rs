//! Credential store boundary and in-memory implementation
//!
//! The native login backend is out of scope for the UI core; it appears
//! here only as the [`CredentialStore`] trait. [`MemoryCredentialStore`]
//! is the reference implementation used by the controllers' tests and by
//! embedders that mirror an external backend into memory.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::core::errors::{CoreError, CoreResult};
use crate::models::{CredentialDraft, CredentialPatch, CredentialRecord};

/// Callback invoked with the full post-mutation snapshot
pub type ChangeListener = Box<dyn FnMut(&[CredentialRecord])>;

/// Handle returned by [`CredentialStore::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// CRUD plus change notifications over the canonical credential set
///
/// Listeners are notified with the full current snapshot after every
/// mutation, never with diffs. Mutations and their notifications are
/// synchronous and strictly ordered per store instance.
pub trait CredentialStore {
    /// Snapshot of all records, in stable insertion order
    fn list(&self) -> CoreResult<Vec<CredentialRecord>>;

    /// Look up a single record by guid
    fn get(&self, guid: &str) -> CoreResult<CredentialRecord>;

    /// Add a new record from a draft, returning the generated guid
    ///
    /// Fails with a validation error when `origin` or `password` is empty.
    /// Sets `time_last_used` and `time_password_changed` to now.
    fn add(&mut self, draft: CredentialDraft) -> CoreResult<String>;

    /// Apply a patch to an existing record
    ///
    /// Advances `time_password_changed` only when the password actually
    /// changed. `time_last_used` is driven by explicit "used" events and
    /// is never advanced here.
    fn update(&mut self, guid: &str, patch: CredentialPatch) -> CoreResult<()>;

    /// Remove a record by guid
    ///
    /// Deleting a guid that is not present is an error; callers must not
    /// double-delete.
    fn delete(&mut self, guid: &str) -> CoreResult<()>;

    /// Register a change listener, returning a handle for unsubscribing
    fn subscribe(&mut self, listener: ChangeListener) -> SubscriptionId;

    /// Remove a previously registered listener
    fn unsubscribe(&mut self, id: SubscriptionId);
}

/// In-memory credential store
///
/// Records are keyed by guid; a separate insertion-order index keeps
/// `list()` deterministic so sorting has a stable tie-break order.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: HashMap<String, CredentialRecord>,
    order: Vec<String>,
    listeners: Vec<(SubscriptionId, ChangeListener)>,
    next_subscription: u64,
}

impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("records", &self.records.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert records verbatim, preserving their guids and timestamps
    ///
    /// This mirrors records that already exist in an external backend, so
    /// none of the add-time stamping applies. Listeners are notified once
    /// after all records are inserted.
    pub fn seed(&mut self, records: Vec<CredentialRecord>) -> CoreResult<()> {
        for record in records {
            if record.guid.is_empty() {
                return Err(CoreError::validation("guid", "guid may not be empty"));
            }
            if self.records.contains_key(&record.guid) {
                return Err(CoreError::validation(
                    "guid",
                    format!("credential with guid '{}' already exists", record.guid),
                ));
            }
            self.order.push(record.guid.clone());
            self.records.insert(record.guid.clone(), record);
        }

        self.notify();
        Ok(())
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check whether a guid is present
    pub fn contains(&self, guid: &str) -> bool {
        self.records.contains_key(guid)
    }

    fn snapshot(&self) -> Vec<CredentialRecord> {
        self.order
            .iter()
            .filter_map(|guid| self.records.get(guid))
            .cloned()
            .collect()
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }

    fn validate_draft(draft: &CredentialDraft) -> CoreResult<()> {
        if draft.origin.trim().is_empty() {
            return Err(CoreError::validation("origin", "origin may not be empty"));
        }
        if draft.password.is_empty() {
            return Err(CoreError::validation(
                "password",
                "password may not be empty",
            ));
        }
        Ok(())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn list(&self) -> CoreResult<Vec<CredentialRecord>> {
        Ok(self.snapshot())
    }

    fn get(&self, guid: &str) -> CoreResult<CredentialRecord> {
        self.records
            .get(guid)
            .cloned()
            .ok_or_else(|| CoreError::not_found(guid))
    }

    fn add(&mut self, draft: CredentialDraft) -> CoreResult<String> {
        Self::validate_draft(&draft)?;

        let record = CredentialRecord::new(draft.origin, draft.username, draft.password);
        let guid = record.guid.clone();

        debug!(guid = %guid, origin = %record.origin, "adding credential");

        self.order.push(guid.clone());
        self.records.insert(guid.clone(), record);
        self.notify();

        Ok(guid)
    }

    fn update(&mut self, guid: &str, patch: CredentialPatch) -> CoreResult<()> {
        let record = self
            .records
            .get_mut(guid)
            .ok_or_else(|| CoreError::not_found(guid))?;

        if let Some(password) = &patch.password {
            if password.is_empty() {
                return Err(CoreError::validation(
                    "password",
                    "password may not be empty",
                ));
            }
            if *password != record.password {
                record.password = password.clone();
                record.time_password_changed = chrono::Utc::now().timestamp_millis();
            }
        }
        if let Some(username) = patch.username {
            record.username = username;
        }

        debug!(guid = %guid, "updated credential");
        self.notify();

        Ok(())
    }

    fn delete(&mut self, guid: &str) -> CoreResult<()> {
        if self.records.remove(guid).is_none() {
            return Err(CoreError::not_found(guid));
        }
        self.order.retain(|g| g != guid);

        debug!(guid = %guid, "deleted credential");
        self.notify();

        Ok(())
    }

    fn subscribe(&mut self, listener: ChangeListener) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }
}
