//! Core state machines for the Lockbox management UI
//!
//! The pieces compose bottom-up: the [`store`] holds the canonical
//! records, [`sort`] orders them, [`item_list`] derives the view model,
//! [`edit_session`] and [`confirm`] gate mutations behind validation and
//! confirmation, and [`manager`] wires everything behind a single intent
//! interface.

pub mod confirm;
pub mod edit_session;
pub mod errors;
pub mod item_list;
pub mod manager;
pub mod sort;
pub mod store;

pub use confirm::{ConfirmationKind, ConfirmationRequest, DeleteConfirmationController};
pub use edit_session::{
    EditSessionController, EditSessionSnapshot, FormField, SessionMode, SessionPhase,
};
pub use errors::{CoreError, CoreResult};
pub use item_list::{ItemListController, ViewModel};
pub use manager::{Intent, ManagerController};
pub use sort::{counter_text, sort_records, MemorySortModeStore, SortMode, SortModePersistence};
pub use store::{ChangeListener, CredentialStore, MemoryCredentialStore, SubscriptionId};
