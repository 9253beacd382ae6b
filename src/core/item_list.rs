//! Item list view model
//!
//! [`ItemListController`] owns the ordered list the UI renders. It is
//! purely derived state: every store snapshot is re-sorted for the
//! current [`SortMode`] and the counter text recomputed. Selection is a
//! reference into the list, not ownership; it is dropped as soon as the
//! selected record disappears from a snapshot.

use tracing::debug;

use crate::core::sort::{counter_text, sort_records, SortMode, SortModePersistence};
use crate::models::CredentialRecord;

/// What the list surface renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    /// Records in the current sort order
    pub records: Vec<CredentialRecord>,

    /// Guid of the selected record, if any
    pub selected_guid: Option<String>,

    /// Pluralized list-size text
    pub counter_text: String,
}

impl ViewModel {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            selected_guid: None,
            counter_text: counter_text(0),
        }
    }

    /// The record at the top of the list, if any
    pub fn top_item(&self) -> Option<&CredentialRecord> {
        self.records.first()
    }

    /// Scheme-stripped origins in list order, rendered as row subtitles
    pub fn subtitles(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(CredentialRecord::display_origin)
            .collect()
    }

    /// The currently selected record, if any
    pub fn selected(&self) -> Option<&CredentialRecord> {
        let guid = self.selected_guid.as_deref()?;
        self.records.iter().find(|r| r.guid == guid)
    }
}

/// Keeps the list view model consistent with store snapshots and user sorting
pub struct ItemListController<P: SortModePersistence> {
    persistence: P,
    mode: SortMode,
    view: ViewModel,
}

impl<P: SortModePersistence> ItemListController<P> {
    /// Create a controller, restoring the persisted sort mode
    pub fn new(persistence: P) -> Self {
        let mode = persistence.load();
        Self {
            persistence,
            mode,
            view: ViewModel::empty(),
        }
    }

    /// The current view model
    pub fn view_model(&self) -> &ViewModel {
        &self.view
    }

    /// The active sort mode
    pub fn sort_mode(&self) -> SortMode {
        self.mode
    }

    /// Recompute the view model from a fresh store snapshot
    pub fn refresh(&mut self, mut snapshot: Vec<CredentialRecord>) {
        sort_records(&mut snapshot, self.mode);

        // Selection follows the record, not a list position. A record
        // that vanished (deleted, possibly externally) clears it with no
        // auto-selection of a replacement.
        if let Some(selected) = &self.view.selected_guid {
            if !snapshot.iter().any(|r| &r.guid == selected) {
                self.view.selected_guid = None;
            }
        }

        self.view.counter_text = counter_text(snapshot.len());
        self.view.records = snapshot;
    }

    /// Change the sort mode, re-sorting immediately and persisting the choice
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        if mode == self.mode {
            return;
        }

        debug!(mode = %mode, "changing sort mode");
        self.mode = mode;
        sort_records(&mut self.view.records, mode);
        self.persistence.persist(mode);
    }

    /// Select a record by guid
    ///
    /// Selecting a guid that is not in the current list is a no-op, not
    /// an error: a click may race an asynchronous store update, and the
    /// prior selection stays in place.
    pub fn select(&mut self, guid: &str) {
        if self.view.records.iter().any(|r| r.guid == guid) {
            self.view.selected_guid = Some(guid.to_string());
        }
    }

    /// Drop the current selection
    pub fn clear_selection(&mut self) {
        self.view.selected_guid = None;
    }
}
