//! Core Code Cafe library (session store, sync client, config).

pub mod config;
pub mod delete;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;
pub mod notice;
pub mod preview;
pub mod store;
pub mod sync;

pub use delete::{DeleteController, DeleteOutcome};
pub use error::{StoreError, SyncError};
pub use identity::{IdentityGate, IdentityStatus};
pub use store::SessionStore;
