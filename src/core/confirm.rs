//! Confirmation gating for destructive and discarding actions
//!
//! Deletes and dirty-form cancels never take effect directly; they emit
//! a [`ConfirmationRequest`] the UI must answer first. At most one
//! request is outstanding at a time.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::errors::{CoreError, CoreResult};
use crate::core::store::CredentialStore;

/// What a pending confirmation would do
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfirmationKind {
    /// Throw away an unsaved new item
    DiscardAdd,

    /// Throw away unsaved changes to an existing item
    DiscardEdit,

    /// Delete an item from the list view
    DeleteItem,

    /// Delete the item currently open in the edit form
    DeleteWhileEditing,
}

/// A pending destructive or discarding action awaiting confirm/decline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub kind: ConfirmationKind,

    /// Target record, present for the delete kinds
    pub guid: Option<String>,
}

impl ConfirmationRequest {
    /// A discard request for the given session kind
    pub fn discard(kind: ConfirmationKind) -> Self {
        Self { kind, guid: None }
    }

    /// A delete request bound to a record
    pub fn delete<S: Into<String>>(kind: ConfirmationKind, guid: S) -> Self {
        Self {
            kind,
            guid: Some(guid.into()),
        }
    }
}

/// Delete confirmation reached from the list view
///
/// Edit-form deletes go through the edit session instead; this
/// controller only handles deletes of a list row. It enforces that a
/// second request cannot be raised while one is pending; the UI is
/// expected to disable the triggering affordance, and a violation is a
/// sequencing fault.
#[derive(Debug, Default)]
pub struct DeleteConfirmationController {
    pending: Option<ConfirmationRequest>,
}

impl DeleteConfirmationController {
    /// Create a controller with no pending request
    pub fn new() -> Self {
        Self::default()
    }

    /// The outstanding request, if any
    pub fn pending(&self) -> Option<&ConfirmationRequest> {
        self.pending.as_ref()
    }

    /// Ask for confirmation to delete `guid`
    pub fn request_delete<S: Into<String>>(&mut self, guid: S) -> CoreResult<ConfirmationRequest> {
        if self.pending.is_some() {
            return Err(CoreError::precondition(
                "a confirmation request is already pending",
            ));
        }

        let request = ConfirmationRequest::delete(ConfirmationKind::DeleteItem, guid);
        self.pending = Some(request.clone());
        Ok(request)
    }

    /// Perform the pending delete
    ///
    /// The request is consumed either way; a record that vanished in the
    /// meantime surfaces as `NotFound` with no state left behind.
    pub fn confirm(&mut self, store: &mut dyn CredentialStore) -> CoreResult<()> {
        let request = self
            .pending
            .take()
            .ok_or_else(|| CoreError::precondition("no confirmation request is pending"))?;

        let guid = request
            .guid
            .ok_or_else(|| CoreError::precondition("delete request has no target"))?;

        debug!(guid = %guid, "confirmed delete from list view");
        store.delete(&guid)
    }

    /// Drop the pending request with no side effect
    pub fn decline(&mut self) -> CoreResult<()> {
        if self.pending.take().is_none() {
            return Err(CoreError::precondition("no confirmation request is pending"));
        }
        Ok(())
    }
}
