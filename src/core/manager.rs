//! Management page controller
//!
//! [`ManagerController`] is the single owner behind the management
//! surface: it wires the store, the item list, the edit session, and the
//! delete confirmation together, and translates discrete UI intents into
//! controller calls. It subscribes to the store's change stream at
//! construction, so every mutation, whether routed through an intent or
//! made directly on the shared store handle, refreshes the list view
//! model before the mutating call returns.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use tracing::warn;

use crate::core::confirm::{ConfirmationRequest, DeleteConfirmationController};
use crate::core::edit_session::{EditSessionController, EditSessionSnapshot, FormField};
use crate::core::errors::{CoreError, CoreResult};
use crate::core::item_list::{ItemListController, ViewModel};
use crate::core::sort::{SortMode, SortModePersistence};
use crate::core::store::{CredentialStore, SubscriptionId};

/// A discrete user action reported by the UI surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The "+" button: open the add form
    AddRequested,

    /// A form field changed
    FieldChanged(FormField, String),

    /// Submit the open form
    SubmitRequested,

    /// Close the open form
    CancelRequested,

    /// Open the edit form for a record
    EditRequested(String),

    /// Answer the pending confirmation positively
    ConfirmRequested,

    /// Answer the pending confirmation negatively
    DeclineRequested,

    /// Delete a record; `None` targets the record open in the edit form
    DeleteRequested(Option<String>),

    /// A list row was clicked
    ItemSelected(String),

    /// The sort dropdown changed
    SortModeChanged(SortMode),
}

/// Which controller owns the outstanding confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingSource {
    EditCancel,
    EditDelete,
    ListDelete,
}

/// Owner of the management-page state machines
pub struct ManagerController<S: CredentialStore, P: SortModePersistence> {
    store: Rc<RefCell<S>>,
    list: Rc<RefCell<ItemListController<P>>>,
    edit: EditSessionController,
    delete_confirm: DeleteConfirmationController,
    confirmation: Option<(PendingSource, ConfirmationRequest)>,
    subscription: SubscriptionId,
}

impl<S: CredentialStore, P: SortModePersistence> ManagerController<S, P> {
    /// Create a controller over a store, restoring the persisted sort mode
    ///
    /// Subscribes to the store's change stream; the list view model
    /// follows every subsequent mutation automatically.
    pub fn new(store: S, persistence: P) -> CoreResult<Self>
    where
        P: 'static,
    {
        let store = Rc::new(RefCell::new(store));
        let list = Rc::new(RefCell::new(ItemListController::new(persistence)));

        let listener_list = Rc::clone(&list);
        let subscription = store.borrow_mut().subscribe(Box::new(move |snapshot| {
            listener_list.borrow_mut().refresh(snapshot.to_vec());
        }));

        let mut manager = Self {
            store,
            list,
            edit: EditSessionController::new(),
            delete_confirm: DeleteConfirmationController::new(),
            confirmation: None,
            subscription,
        };
        manager.sync()?;
        Ok(manager)
    }

    /// The list view model
    pub fn view_model(&self) -> Ref<'_, ViewModel> {
        Ref::map(self.list.borrow(), |list| list.view_model())
    }

    /// The edit form snapshot
    pub fn edit_state(&self) -> EditSessionSnapshot {
        self.edit.snapshot()
    }

    /// The outstanding confirmation request, if any
    pub fn confirmation(&self) -> Option<&ConfirmationRequest> {
        self.confirmation.as_ref().map(|(_, request)| request)
    }

    /// The active sort mode
    pub fn sort_mode(&self) -> SortMode {
        self.list.borrow().sort_mode()
    }

    /// Borrow the underlying store
    pub fn store(&self) -> Ref<'_, S> {
        self.store.borrow()
    }

    /// Borrow the underlying store mutably
    ///
    /// Mutations made through here notify the change stream, so the list
    /// view model is refreshed before the call returns.
    pub fn store_mut(&self) -> RefMut<'_, S> {
        self.store.borrow_mut()
    }

    /// Load the current snapshot into the list at construction
    fn sync(&mut self) -> CoreResult<()> {
        let snapshot = self.store.borrow().list()?;
        self.list.borrow_mut().refresh(snapshot);
        Ok(())
    }

    /// Route a UI intent to the owning controller
    pub fn apply(&mut self, intent: Intent) -> CoreResult<()> {
        match intent {
            Intent::AddRequested => {
                self.require_no_confirmation()?;
                self.edit.open_add()
            }

            Intent::EditRequested(guid) => {
                self.require_no_confirmation()?;
                let store = self.store.borrow();
                self.edit.open_edit(&guid, &*store)
            }

            Intent::FieldChanged(field, value) => self.edit.update_field(field, value),

            Intent::SubmitRequested => self.edit.submit(&mut *self.store.borrow_mut()),

            Intent::CancelRequested => {
                self.require_no_confirmation()?;
                if let Some(request) = self.edit.request_cancel()? {
                    self.confirmation = Some((PendingSource::EditCancel, request));
                }
                Ok(())
            }

            Intent::DeleteRequested(None) => {
                self.require_no_confirmation()?;
                let request = self.edit.request_delete()?;
                self.confirmation = Some((PendingSource::EditDelete, request));
                Ok(())
            }

            Intent::DeleteRequested(Some(guid)) => {
                self.require_no_confirmation()?;
                if self.edit.is_open() {
                    return Err(CoreError::precondition(
                        "list deletes are not available while the edit form is open",
                    ));
                }
                let request = self.delete_confirm.request_delete(guid)?;
                self.confirmation = Some((PendingSource::ListDelete, request));
                Ok(())
            }

            Intent::ConfirmRequested => {
                let (source, _) = self
                    .confirmation
                    .take()
                    .ok_or_else(|| CoreError::precondition("no confirmation request is pending"))?;

                match source {
                    PendingSource::EditCancel => self.edit.confirm_cancel(),
                    PendingSource::EditDelete => {
                        self.edit.confirm_delete(&mut *self.store.borrow_mut())
                    }
                    PendingSource::ListDelete => {
                        self.delete_confirm.confirm(&mut *self.store.borrow_mut())
                    }
                }
            }

            Intent::DeclineRequested => {
                let (source, _) = self
                    .confirmation
                    .take()
                    .ok_or_else(|| CoreError::precondition("no confirmation request is pending"))?;

                match source {
                    PendingSource::EditCancel => self.edit.abort_cancel_request(),
                    PendingSource::EditDelete => self.edit.decline_delete(),
                    PendingSource::ListDelete => self.delete_confirm.decline(),
                }
            }

            Intent::ItemSelected(guid) => {
                self.list.borrow_mut().select(&guid);
                Ok(())
            }

            Intent::SortModeChanged(mode) => {
                self.list.borrow_mut().set_sort_mode(mode);
                Ok(())
            }
        }
    }

    fn require_no_confirmation(&self) -> CoreResult<()> {
        if self.confirmation.is_some() {
            warn!("intent rejected while a confirmation request is pending");
            return Err(CoreError::precondition(
                "a confirmation request is already pending",
            ));
        }
        Ok(())
    }
}

impl<S: CredentialStore, P: SortModePersistence> Drop for ManagerController<S, P> {
    fn drop(&mut self) {
        self.store.borrow_mut().unsubscribe(self.subscription);
    }
}
