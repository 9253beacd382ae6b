//! Shared data models for Lockbox
//!
//! This module contains the core data structures used throughout the
//! Lockbox UI core: saved credential records as they come from the
//! native login backend, plus the draft and patch types the edit flow
//! feeds back into the store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved website credential with its usage metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Unique identifier, stable for the record's lifetime
    pub guid: String,

    /// The site URL this credential belongs to
    pub origin: String,

    /// Login username (may be empty)
    pub username: String,

    /// Login password
    pub password: String,

    /// When this record was created (epoch milliseconds)
    pub time_created: i64,

    /// When this credential was last used to log in (epoch milliseconds)
    pub time_last_used: i64,

    /// When the password was last changed (epoch milliseconds)
    pub time_password_changed: i64,

    /// How many times this credential has been used
    pub times_used: u32,
}

impl CredentialRecord {
    /// Create a new record with a generated guid and all timestamps set to now
    pub fn new<S: Into<String>>(origin: S, username: S, password: S) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Self {
            guid: Uuid::new_v4().to_string(),
            origin: origin.into(),
            username: username.into(),
            password: password.into(),
            time_created: now,
            time_last_used: now,
            time_password_changed: now,
            times_used: 0,
        }
    }

    /// Origin with the scheme stripped, as shown in list subtitles
    pub fn display_origin(&self) -> &str {
        self.origin
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.origin)
    }
}

/// Working values for a credential that does not exist yet
///
/// This is what the add form submits; the store assigns the guid and
/// timestamps when the draft is accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialDraft {
    pub origin: String,
    pub username: String,
    pub password: String,
}

impl CredentialDraft {
    /// Create a draft with all fields filled in
    pub fn new<S: Into<String>>(origin: S, username: S, password: S) -> Self {
        Self {
            origin: origin.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Field changes applied to an existing record
///
/// Origin is immutable once a record exists, so a patch can only carry
/// the editable fields. A `None` field is left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialPatch {
    pub username: Option<String>,
    pub password: Option<String>,
}
