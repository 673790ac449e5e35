//! Session Sync Client: request wrappers around the session collection.
//!
//! Implementations issue exactly one round-trip per call and never retry.

mod http;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use cafe_types::{Message, NewMessage, Session, SessionDetail};

pub use self::http::HttpSessionSync;
pub use self::memory::{MemorySessionSync, SyncOp};
use crate::config::Config;
use crate::error::SyncError;

pub type SyncResult<T> = Result<T, SyncError>;

/// Backing collection of the principal's sessions.
#[async_trait]
pub trait SessionSync: Send + Sync {
    /// All sessions owned by the principal, in server order.
    async fn list(&self) -> SyncResult<Vec<Session>>;

    /// Creates a session with server-assigned defaults.
    async fn create(&self) -> SyncResult<Session>;

    /// Deletes a session and returns the removed record.
    async fn delete(&self, id: &str) -> SyncResult<Session>;

    /// One session with its messages.
    async fn get_one(&self, id: &str) -> SyncResult<SessionDetail>;

    /// Persists a message under its session id.
    async fn post_message(&self, message: &NewMessage) -> SyncResult<Message>;
}

/// Builds the backend selected by `config`.
///
/// `principal_id` seeds ownership for the in-memory backend.
pub fn from_config(config: &Config, principal_id: &str) -> anyhow::Result<Arc<dyn SessionSync>> {
    if config.offline {
        tracing::debug!("Using in-memory session backend");
        return Ok(Arc::new(MemorySessionSync::new(principal_id)));
    }

    let client = HttpSessionSync::new(
        &config.base_url,
        config.auth.token.clone(),
        config.request_timeout(),
    )?;
    Ok(Arc::new(client))
}
