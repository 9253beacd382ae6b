//! Add/edit form state machine
//!
//! [`EditSessionController`] owns the lifecycle of the credential form:
//! `Closed -> Open(Add|Edit) -> { Submitting -> Closed, CancelRequested
//! -> { Closed, Open } }`, plus the delete-while-editing gate. Dirty
//! tracking is a structural comparison of the working copy against the
//! baseline snapshot taken at open, so a field changed and changed back
//! counts as clean.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::confirm::{ConfirmationKind, ConfirmationRequest};
use crate::core::errors::{CoreError, CoreResult};
use crate::core::store::CredentialStore;
use crate::models::{CredentialDraft, CredentialPatch};

/// Whether the form creates a new record or edits an existing one
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionMode {
    Add,
    Edit,
}

/// Editable form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Origin,
    Username,
    Password,
}

impl FormField {
    /// Field name as surfaced in validation errors
    pub fn name(&self) -> &'static str {
        match self {
            FormField::Origin => "origin",
            FormField::Username => "username",
            FormField::Password => "password",
        }
    }
}

/// Where the session currently is in its lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SessionPhase {
    /// No form is open
    Closed,

    /// The form is open and accepting field changes
    Open,

    /// A store call is in flight; conflicting intents are rejected
    Submitting,

    /// A dirty cancel is awaiting confirm/decline
    CancelRequested,

    /// A delete of the edited record is awaiting confirm/decline
    DeleteRequested,
}

/// Form values, compared structurally for dirty tracking
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct WorkingCopy {
    origin: String,
    username: String,
    password: String,
}

#[derive(Debug, Clone)]
struct Session {
    mode: SessionMode,
    /// Present in Edit mode; the record being edited
    target_guid: Option<String>,
    baseline: WorkingCopy,
    working: WorkingCopy,
}

impl Session {
    fn dirty(&self) -> bool {
        self.working != self.baseline
    }
}

#[derive(Debug)]
enum State {
    Closed,
    Open(Session),
    Submitting(Session),
    CancelRequested(Session),
    DeleteRequested(Session),
}

/// Outbound snapshot of the edit session for the UI surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSessionSnapshot {
    pub phase: SessionPhase,
    pub mode: Option<SessionMode>,
    pub origin: String,
    pub username: String,
    pub password: String,
    pub dirty: bool,
    pub target_guid: Option<String>,
}

impl EditSessionSnapshot {
    fn closed() -> Self {
        Self {
            phase: SessionPhase::Closed,
            mode: None,
            origin: String::new(),
            username: String::new(),
            password: String::new(),
            dirty: false,
            target_guid: None,
        }
    }
}

/// State machine for the add/edit credential form
#[derive(Debug, Default)]
pub struct EditSessionController {
    state: State,
}

impl Default for State {
    fn default() -> Self {
        State::Closed
    }
}

impl EditSessionController {
    /// Create a controller with no session open
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        match &self.state {
            State::Closed => SessionPhase::Closed,
            State::Open(_) => SessionPhase::Open,
            State::Submitting(_) => SessionPhase::Submitting,
            State::CancelRequested(_) => SessionPhase::CancelRequested,
            State::DeleteRequested(_) => SessionPhase::DeleteRequested,
        }
    }

    /// Whether any session is open (in any phase but Closed)
    pub fn is_open(&self) -> bool {
        !matches!(self.state, State::Closed)
    }

    /// Whether the working copy differs from the baseline
    pub fn is_dirty(&self) -> bool {
        self.session().map(Session::dirty).unwrap_or(false)
    }

    /// Snapshot for the UI surface
    pub fn snapshot(&self) -> EditSessionSnapshot {
        match self.session() {
            None => EditSessionSnapshot::closed(),
            Some(session) => EditSessionSnapshot {
                phase: self.phase(),
                mode: Some(session.mode),
                origin: session.working.origin.clone(),
                username: session.working.username.clone(),
                password: session.working.password.clone(),
                dirty: session.dirty(),
                target_guid: session.target_guid.clone(),
            },
        }
    }

    fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Closed => None,
            State::Open(s)
            | State::Submitting(s)
            | State::CancelRequested(s)
            | State::DeleteRequested(s) => Some(s),
        }
    }

    fn require_closed(&self) -> CoreResult<()> {
        if self.is_open() {
            return Err(CoreError::precondition("an edit session is already open"));
        }
        Ok(())
    }

    /// Open the form for a new credential
    pub fn open_add(&mut self) -> CoreResult<()> {
        self.require_closed()?;

        debug!("opening add session");
        self.state = State::Open(Session {
            mode: SessionMode::Add,
            target_guid: None,
            baseline: WorkingCopy::default(),
            working: WorkingCopy::default(),
        });
        Ok(())
    }

    /// Open the form for an existing credential
    ///
    /// Fails with `NotFound` (and stays Closed) when the guid no longer
    /// resolves in the store, which happens when another actor deleted
    /// the record in the meantime.
    pub fn open_edit(&mut self, guid: &str, store: &dyn CredentialStore) -> CoreResult<()> {
        self.require_closed()?;

        let record = store.get(guid)?;
        let baseline = WorkingCopy {
            origin: record.origin,
            username: record.username,
            password: record.password,
        };

        debug!(guid = %guid, "opening edit session");
        self.state = State::Open(Session {
            mode: SessionMode::Edit,
            target_guid: Some(guid.to_string()),
            working: baseline.clone(),
            baseline,
        });
        Ok(())
    }

    /// Change a field of the working copy
    pub fn update_field<S: Into<String>>(&mut self, field: FormField, value: S) -> CoreResult<()> {
        let session = match &mut self.state {
            State::Open(session) => session,
            _ => return Err(CoreError::precondition("no open edit session")),
        };

        let value = value.into();
        match field {
            FormField::Origin => {
                if session.mode == SessionMode::Edit {
                    return Err(CoreError::precondition(
                        "origin is immutable once a record exists",
                    ));
                }
                session.working.origin = value;
            }
            FormField::Username => session.working.username = value,
            FormField::Password => session.working.password = value,
        }
        Ok(())
    }

    /// Validate and commit the working copy to the store
    ///
    /// Validation failures surface as a field-level error and leave the
    /// session open; no store call is attempted. A `NotFound` from the
    /// store closes the session; it must not stay open against a record
    /// that no longer exists. Other store failures return to Open so the
    /// user can retry the submit.
    pub fn submit(&mut self, store: &mut dyn CredentialStore) -> CoreResult<()> {
        let session = match std::mem::take(&mut self.state) {
            State::Open(session) => session,
            State::Submitting(session) => {
                self.state = State::Submitting(session);
                return Err(CoreError::precondition("a submit is already in flight"));
            }
            other => {
                self.state = other;
                return Err(CoreError::precondition("no open edit session"));
            }
        };

        if let Err(err) = Self::validate(&session) {
            self.state = State::Open(session);
            return Err(err);
        }

        let target_guid = match (session.mode, session.target_guid.clone()) {
            (SessionMode::Edit, None) => {
                self.state = State::Open(session);
                return Err(CoreError::precondition("edit session has no target"));
            }
            (_, guid) => guid,
        };

        self.state = State::Submitting(session.clone());
        let result = match session.mode {
            SessionMode::Add => store
                .add(CredentialDraft {
                    origin: session.working.origin.clone(),
                    username: session.working.username.clone(),
                    password: session.working.password.clone(),
                })
                .map(|_| ()),
            SessionMode::Edit => store.update(
                // Checked above; Edit always carries a target.
                target_guid.as_deref().unwrap_or_default(),
                CredentialPatch {
                    username: Some(session.working.username.clone()),
                    password: Some(session.working.password.clone()),
                },
            ),
        };

        match result {
            Ok(()) => {
                debug!(mode = ?session.mode, "edit session submitted");
                self.state = State::Closed;
                Ok(())
            }
            Err(err @ CoreError::NotFound { .. }) => {
                self.state = State::Closed;
                Err(err)
            }
            Err(err) => {
                self.state = State::Open(session);
                Err(err)
            }
        }
    }

    /// Ask to close the form
    ///
    /// A clean form closes immediately with no confirmation. A dirty one
    /// emits a discard confirmation and waits.
    pub fn request_cancel(&mut self) -> CoreResult<Option<ConfirmationRequest>> {
        let session = match std::mem::take(&mut self.state) {
            State::Open(session) => session,
            other => {
                self.state = other;
                return Err(CoreError::precondition("no open edit session"));
            }
        };

        if !session.dirty() {
            debug!("clean cancel, closing without confirmation");
            self.state = State::Closed;
            return Ok(None);
        }

        let kind = match session.mode {
            SessionMode::Add => ConfirmationKind::DiscardAdd,
            SessionMode::Edit => ConfirmationKind::DiscardEdit,
        };
        self.state = State::CancelRequested(session);
        Ok(Some(ConfirmationRequest::discard(kind)))
    }

    /// Confirm a pending cancel, discarding the working copy
    pub fn confirm_cancel(&mut self) -> CoreResult<()> {
        match std::mem::take(&mut self.state) {
            State::CancelRequested(_) => {
                self.state = State::Closed;
                Ok(())
            }
            other => {
                self.state = other;
                Err(CoreError::precondition("no cancel is awaiting confirmation"))
            }
        }
    }

    /// Decline a pending cancel, returning to the form unchanged
    pub fn abort_cancel_request(&mut self) -> CoreResult<()> {
        match std::mem::take(&mut self.state) {
            State::CancelRequested(session) => {
                self.state = State::Open(session);
                Ok(())
            }
            other => {
                self.state = other;
                Err(CoreError::precondition("no cancel is awaiting confirmation"))
            }
        }
    }

    /// Ask to delete the record currently being edited
    ///
    /// Always confirmed, regardless of dirty state. Only valid in an
    /// open Edit session.
    pub fn request_delete(&mut self) -> CoreResult<ConfirmationRequest> {
        let session = match std::mem::take(&mut self.state) {
            State::Open(session) => session,
            other => {
                self.state = other;
                return Err(CoreError::precondition("no open edit session"));
            }
        };

        if session.mode != SessionMode::Edit {
            self.state = State::Open(session);
            return Err(CoreError::precondition(
                "delete-while-editing requires an edit session",
            ));
        }

        let guid = match session.target_guid.clone() {
            Some(guid) => guid,
            None => {
                self.state = State::Open(session);
                return Err(CoreError::precondition("edit session has no target"));
            }
        };

        self.state = State::DeleteRequested(session);
        Ok(ConfirmationRequest::delete(
            ConfirmationKind::DeleteWhileEditing,
            guid,
        ))
    }

    /// Confirm the pending delete, removing the record and closing
    ///
    /// The session closes even when the record was already deleted by
    /// another actor; the `NotFound` is surfaced to the caller.
    pub fn confirm_delete(&mut self, store: &mut dyn CredentialStore) -> CoreResult<()> {
        let session = match std::mem::take(&mut self.state) {
            State::DeleteRequested(session) => session,
            other => {
                self.state = other;
                return Err(CoreError::precondition("no delete is awaiting confirmation"));
            }
        };

        let guid = session
            .target_guid
            .as_deref()
            .ok_or_else(|| CoreError::precondition("edit session has no target"))?;

        debug!(guid = %guid, "confirmed delete while editing");
        self.state = State::Closed;
        store.delete(guid)
    }

    /// Decline the pending delete, returning to the form unchanged
    pub fn decline_delete(&mut self) -> CoreResult<()> {
        match std::mem::take(&mut self.state) {
            State::DeleteRequested(session) => {
                self.state = State::Open(session);
                Ok(())
            }
            other => {
                self.state = other;
                Err(CoreError::precondition("no delete is awaiting confirmation"))
            }
        }
    }

    fn validate(session: &Session) -> CoreResult<()> {
        if session.mode == SessionMode::Add && session.working.origin.trim().is_empty() {
            return Err(CoreError::validation("origin", "origin may not be empty"));
        }
        if session.working.password.is_empty() {
            return Err(CoreError::validation(
                "password",
                "password may not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryCredentialStore;
    use assert_matches::assert_matches;

    fn store_with_one() -> (MemoryCredentialStore, String) {
        let mut store = MemoryCredentialStore::new();
        let guid = store
            .add(CredentialDraft::new("https://example.com", "user", "secret"))
            .unwrap();
        (store, guid)
    }

    fn open_edit(guid: &str, store: &MemoryCredentialStore) -> EditSessionController {
        let mut session = EditSessionController::new();
        session.open_edit(guid, store).unwrap();
        session
    }

    #[test]
    fn test_open_add_then_submit_creates_record() {
        let mut store = MemoryCredentialStore::new();
        let mut session = EditSessionController::new();

        session.open_add().unwrap();
        session
            .update_field(FormField::Origin, "https://foo.example.com")
            .unwrap();
        session.update_field(FormField::Username, "testUser").unwrap();
        session
            .update_field(FormField::Password, "testPassword")
            .unwrap();
        session.submit(&mut store).unwrap();

        assert_eq!(session.phase(), SessionPhase::Closed);
        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username, "testUser");
    }

    #[test]
    fn test_open_while_open_fails() {
        let (store, guid) = store_with_one();
        let mut session = EditSessionController::new();
        session.open_add().unwrap();

        assert_matches!(session.open_add(), Err(CoreError::Precondition { .. }));
        assert_matches!(
            session.open_edit(&guid, &store),
            Err(CoreError::Precondition { .. })
        );
    }

    #[test]
    fn test_open_edit_on_deleted_record_stays_closed() {
        let (mut store, guid) = store_with_one();
        store.delete(&guid).unwrap();

        let mut session = EditSessionController::new();
        assert_matches!(
            session.open_edit(&guid, &store),
            Err(CoreError::NotFound { .. })
        );
        assert_eq!(session.phase(), SessionPhase::Closed);
    }

    #[test]
    fn test_clean_cancel_needs_no_confirmation() {
        let (store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);

        let request = session.request_cancel().unwrap();
        assert!(request.is_none());
        assert_eq!(session.phase(), SessionPhase::Closed);
    }

    #[test]
    fn test_changed_and_reverted_field_is_clean() {
        let (store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);

        session.update_field(FormField::Username, "other").unwrap();
        assert!(session.is_dirty());

        session.update_field(FormField::Username, "user").unwrap();
        assert!(!session.is_dirty());

        // Clean again, so cancel closes directly.
        assert!(session.request_cancel().unwrap().is_none());
    }

    #[test]
    fn test_dirty_cancel_confirms_discard() {
        let (store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);
        session.update_field(FormField::Username, "edited").unwrap();

        let request = session.request_cancel().unwrap().unwrap();
        assert_eq!(request.kind, ConfirmationKind::DiscardEdit);
        assert_eq!(session.phase(), SessionPhase::CancelRequested);

        session.confirm_cancel().unwrap();
        assert_eq!(session.phase(), SessionPhase::Closed);
    }

    #[test]
    fn test_dirty_add_cancel_emits_discard_add() {
        let mut session = EditSessionController::new();
        session.open_add().unwrap();
        session
            .update_field(FormField::Origin, "https://example.com")
            .unwrap();

        let request = session.request_cancel().unwrap().unwrap();
        assert_eq!(request.kind, ConfirmationKind::DiscardAdd);
    }

    #[test]
    fn test_aborted_cancel_keeps_edits() {
        let (store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);
        session.update_field(FormField::Username, "edited").unwrap();

        session.request_cancel().unwrap();
        session.abort_cancel_request().unwrap();

        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.snapshot().username, "edited");
        assert!(session.is_dirty());
    }

    #[test]
    fn test_field_changes_rejected_while_cancel_pending() {
        let (store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);
        session.update_field(FormField::Username, "edited").unwrap();
        session.request_cancel().unwrap();

        assert_matches!(
            session.update_field(FormField::Username, "more"),
            Err(CoreError::Precondition { .. })
        );
    }

    #[test]
    fn test_submit_edit_updates_record() {
        let (mut store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);

        session
            .update_field(FormField::Username, "userEdited")
            .unwrap();
        session
            .update_field(FormField::Password, "passwordEdited")
            .unwrap();
        session.submit(&mut store).unwrap();

        let record = store.get(&guid).unwrap();
        assert_eq!(record.username, "userEdited");
        assert_eq!(record.password, "passwordEdited");
    }

    #[test]
    fn test_submit_validation_keeps_session_open() {
        let mut store = MemoryCredentialStore::new();
        let mut session = EditSessionController::new();
        session.open_add().unwrap();
        session
            .update_field(FormField::Password, "testPassword")
            .unwrap();

        // Origin still empty; no store call may happen.
        let err = session.submit(&mut store).unwrap_err();
        assert_matches!(err, CoreError::Validation { field, .. } if field == "origin");
        assert_eq!(session.phase(), SessionPhase::Open);
        assert!(store.is_empty());
    }

    #[test]
    fn test_submit_empty_password_rejected_in_edit() {
        let (mut store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);
        session.update_field(FormField::Password, "").unwrap();

        let err = session.submit(&mut store).unwrap_err();
        assert_matches!(err, CoreError::Validation { field, .. } if field == "password");
        assert_eq!(session.phase(), SessionPhase::Open);
    }

    #[test]
    fn test_origin_is_immutable_in_edit() {
        let (store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);

        assert_matches!(
            session.update_field(FormField::Origin, "https://other.com"),
            Err(CoreError::Precondition { .. })
        );
    }

    #[test]
    fn test_submit_on_concurrently_deleted_record_closes() {
        let (mut store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);
        session.update_field(FormField::Username, "edited").unwrap();

        store.delete(&guid).unwrap();

        let err = session.submit(&mut store).unwrap_err();
        assert_matches!(err, CoreError::NotFound { .. });
        assert_eq!(session.phase(), SessionPhase::Closed);
    }

    #[test]
    fn test_delete_while_editing_flow() {
        let (mut store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);

        let request = session.request_delete().unwrap();
        assert_eq!(request.kind, ConfirmationKind::DeleteWhileEditing);
        assert_eq!(request.guid.as_deref(), Some(guid.as_str()));
        assert_eq!(session.phase(), SessionPhase::DeleteRequested);

        session.confirm_delete(&mut store).unwrap();
        assert_eq!(session.phase(), SessionPhase::Closed);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_while_editing_declined_stays_open() {
        let (mut store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);
        session.update_field(FormField::Username, "edited").unwrap();

        session.request_delete().unwrap();
        session.decline_delete().unwrap();

        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.snapshot().username, "edited");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_confirmed_even_when_clean() {
        let (mut store, guid) = store_with_one();
        let mut session = open_edit(&guid, &store);

        // Not dirty, but delete still goes through confirmation.
        assert!(!session.is_dirty());
        assert!(session.request_delete().is_ok());
        assert_eq!(session.phase(), SessionPhase::DeleteRequested);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_requires_edit_mode() {
        let mut session = EditSessionController::new();
        session.open_add().unwrap();

        assert_matches!(session.request_delete(), Err(CoreError::Precondition { .. }));
        assert_eq!(session.phase(), SessionPhase::Open);
    }

    #[test]
    fn test_snapshot_reflects_closed_session() {
        let session = EditSessionController::new();
        let snapshot = session.snapshot();

        assert_eq!(snapshot.phase, SessionPhase::Closed);
        assert_eq!(snapshot.mode, None);
        assert!(!snapshot.dirty);
    }

    /// Store double whose mutations always fail as unreachable backend
    struct UnavailableStore;

    impl CredentialStore for UnavailableStore {
        fn list(&self) -> crate::core::errors::CoreResult<Vec<crate::models::CredentialRecord>> {
            Err(unavailable())
        }

        fn get(
            &self,
            _guid: &str,
        ) -> crate::core::errors::CoreResult<crate::models::CredentialRecord> {
            Err(unavailable())
        }

        fn add(&mut self, _draft: CredentialDraft) -> crate::core::errors::CoreResult<String> {
            Err(unavailable())
        }

        fn update(
            &mut self,
            _guid: &str,
            _patch: CredentialPatch,
        ) -> crate::core::errors::CoreResult<()> {
            Err(unavailable())
        }

        fn delete(&mut self, _guid: &str) -> crate::core::errors::CoreResult<()> {
            Err(unavailable())
        }

        fn subscribe(
            &mut self,
            _listener: crate::core::store::ChangeListener,
        ) -> crate::core::store::SubscriptionId {
            crate::core::store::SubscriptionId::new(0)
        }

        fn unsubscribe(&mut self, _id: crate::core::store::SubscriptionId) {}
    }

    fn unavailable() -> CoreError {
        CoreError::Unavailable {
            message: "backend unreachable".to_string(),
        }
    }

    #[test]
    fn test_unavailable_store_leaves_session_open_for_retry() {
        let mut unavailable_store = UnavailableStore;
        let mut session = EditSessionController::new();

        session.open_add().unwrap();
        session
            .update_field(FormField::Origin, "https://example.com")
            .unwrap();
        session.update_field(FormField::Password, "secret").unwrap();

        let err = session.submit(&mut unavailable_store).unwrap_err();
        assert_matches!(err, CoreError::Unavailable { .. });

        // The working copy survives so the user can retry the submit.
        assert_eq!(session.phase(), SessionPhase::Open);
        assert_eq!(session.snapshot().origin, "https://example.com");
    }

    #[test]
    fn test_snapshot_reflects_open_edit() {
        let (store, guid) = store_with_one();
        let session = open_edit(&guid, &store);
        let snapshot = session.snapshot();

        assert_eq!(snapshot.phase, SessionPhase::Open);
        assert_eq!(snapshot.mode, Some(SessionMode::Edit));
        assert_eq!(snapshot.origin, "https://example.com");
        assert_eq!(snapshot.username, "user");
        assert_eq!(snapshot.target_guid.as_deref(), Some(guid.as_str()));
    }
}
