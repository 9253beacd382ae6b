//! Sort order for the credential list
//!
//! Comparators are total orders with stable tie-break: `sort_records`
//! uses the standard library's stable sort, so records with equal keys
//! keep the relative order the store listed them in. The chosen mode is
//! persisted through [`SortModePersistence`] so it survives a page
//! reload.

use serde::{Deserialize, Serialize};

use crate::models::CredentialRecord;

/// How the credential list is ordered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortMode {
    /// By origin, case-insensitive ascending
    #[default]
    #[serde(rename = "name")]
    ByName,

    /// Most recently used first
    #[serde(rename = "last-used")]
    ByLastUsed,

    /// Most recently changed password first
    #[serde(rename = "last-changed")]
    ByLastChanged,
}

impl SortMode {
    /// The identifier persisted for this mode
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::ByName => "name",
            SortMode::ByLastUsed => "last-used",
            SortMode::ByLastChanged => "last-changed",
        }
    }

    /// Parse a persisted mode identifier
    pub fn parse(s: &str) -> Option<SortMode> {
        match s {
            "name" => Some(SortMode::ByName),
            "last-used" => Some(SortMode::ByLastUsed),
            "last-changed" => Some(SortMode::ByLastChanged),
            _ => None,
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort records in place according to `mode`
///
/// Equal keys preserve their incoming relative order.
pub fn sort_records(records: &mut [CredentialRecord], mode: SortMode) {
    match mode {
        SortMode::ByName => {
            records.sort_by(|a, b| {
                a.origin
                    .to_lowercase()
                    .cmp(&b.origin.to_lowercase())
            });
        }
        SortMode::ByLastUsed => {
            records.sort_by(|a, b| b.time_last_used.cmp(&a.time_last_used));
        }
        SortMode::ByLastChanged => {
            records.sort_by(|a, b| b.time_password_changed.cmp(&a.time_password_changed));
        }
    }
}

/// Pluralized list-size text shown under the credential list
pub fn counter_text(count: usize) -> String {
    if count == 1 {
        "1 entry".to_string()
    } else {
        format!("{count} entries")
    }
}

/// Persistence for the chosen sort mode
///
/// `persist` is fire-and-forget from the controller's perspective:
/// implementations log failures rather than surface them.
pub trait SortModePersistence {
    /// The persisted mode, or the default when nothing is stored
    fn load(&self) -> SortMode;

    /// Store the mode so it survives a reload
    fn persist(&mut self, mode: SortMode);
}

/// In-memory mode store for tests and embedders without a config dir
#[derive(Debug, Clone, Default)]
pub struct MemorySortModeStore {
    mode: Option<SortMode>,
}

impl MemorySortModeStore {
    /// Create a store with nothing persisted yet
    pub fn new() -> Self {
        Self::default()
    }
}

impl SortModePersistence for MemorySortModeStore {
    fn load(&self) -> SortMode {
        self.mode.unwrap_or_default()
    }

    fn persist(&mut self, mode: SortMode) {
        self.mode = Some(mode);
    }
}
