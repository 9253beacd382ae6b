//! Lockbox UI core
//!
//! This crate contains the item-list state machine and the
//! sort/edit/delete confirmation logic behind the Lockbox credential
//! manager's toolbar popup and management page. It keeps a mutable,
//! externally-sourced collection of credential records consistent with
//! user intent across add/edit/delete operations, gates destructive and
//! discarding actions behind confirmation, and derives the sorted list
//! and counter text the UI renders.
//!
//! Rendering, browser chrome, and the native login backend are out of
//! scope; they appear only as boundary interfaces:
//!
//! - [`core::CredentialStore`]: CRUD plus change notifications over the
//!   canonical record set ([`core::MemoryCredentialStore`] is the
//!   in-memory reference implementation);
//! - [`core::Intent`] and the snapshot accessors on
//!   [`core::ManagerController`]: the discrete actions a UI surface
//!   reports and the view state it renders.
//!
//! # Usage
//!
//! ```rust
//! use lockbox_core::core::{FormField, Intent, ManagerController};
//! use lockbox_core::core::{MemoryCredentialStore, MemorySortModeStore};
//!
//! let store = MemoryCredentialStore::new();
//! let mut manager = ManagerController::new(store, MemorySortModeStore::new()).unwrap();
//!
//! manager.apply(Intent::AddRequested).unwrap();
//! manager
//!     .apply(Intent::FieldChanged(
//!         FormField::Origin,
//!         "https://example.com".to_string(),
//!     ))
//!     .unwrap();
//! manager
//!     .apply(Intent::FieldChanged(
//!         FormField::Password,
//!         "s3cret".to_string(),
//!     ))
//!     .unwrap();
//! manager.apply(Intent::SubmitRequested).unwrap();
//!
//! assert_eq!(manager.view_model().counter_text, "1 entry");
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod models;

// Re-export commonly used types for convenience
pub use config::{PrefsManager, PrefsPaths, UiPrefs};
pub use core::{
    ConfirmationKind, ConfirmationRequest, CoreError, CoreResult, CredentialStore,
    DeleteConfirmationController, EditSessionController, EditSessionSnapshot, FormField, Intent,
    ItemListController, ManagerController, MemoryCredentialStore, MemorySortModeStore,
    SessionMode, SessionPhase, SortMode, SortModePersistence, ViewModel,
};
pub use models::{CredentialDraft, CredentialPatch, CredentialRecord};

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
