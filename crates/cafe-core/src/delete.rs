//! Delete Controller: per-session pending guard over the store.
//!
//! State per id is `Idle -> Pending -> (Idle | removed)`. The pending set is
//! a watch channel so presenters can render a spinner per session.

use std::collections::HashSet;
use std::sync::Arc;

use cafe_types::Session;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::store::SessionStore;

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// A delete for this id was already in flight; nothing was sent.
    Skipped,
    Deleted(Session),
    Failed(StoreError),
}

pub struct DeleteController {
    store: Arc<SessionStore>,
    pending: watch::Sender<HashSet<String>>,
}

/// Clears the pending mark when the request settles, however it settles.
struct PendingGuard<'a> {
    pending: &'a watch::Sender<HashSet<String>>,
    id: &'a str,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.send_modify(|set| {
            set.remove(self.id);
        });
    }
}

impl DeleteController {
    pub fn new(store: Arc<SessionStore>) -> Self {
        let (pending, _rx) = watch::channel(HashSet::new());
        Self { store, pending }
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.borrow().contains(id)
    }

    pub fn subscribe_pending(&self) -> watch::Receiver<HashSet<String>> {
        self.pending.subscribe()
    }

    /// Deletes `id` on the server, then drops it from the store.
    ///
    /// The store is only touched after the server confirms.
    pub async fn request_delete(&self, id: &str) -> DeleteOutcome {
        let inserted = self.pending.send_if_modified(|set| set.insert(id.to_string()));
        if !inserted {
            tracing::debug!(session_id = %id, "Delete already pending, skipping");
            return DeleteOutcome::Skipped;
        }
        let _guard = PendingGuard {
            pending: &self.pending,
            id,
        };

        let name = self
            .store
            .get(id)
            .map_or_else(|| id.to_string(), |s| s.name);
        let notices = self.store.notices();
        let notice = notices.loading(format!("Deleting cafe {name}..."));

        match self.store.issue_delete(id).await {
            Ok(session) => {
                self.store.remove(id);
                tracing::info!(session_id = %id, "Session deleted");
                notices.success(notice, format!("{name} deleted successfully"));
                DeleteOutcome::Deleted(session)
            }
            Err(err) => {
                tracing::error!(session_id = %id, error = %err, "Session delete failed");
                notices.error(notice, format!("Failed to delete {name}"));
                DeleteOutcome::Failed(StoreError::DeleteFailed {
                    id: id.to_string(),
                    source: err,
                })
            }
        }
    }
}

impl std::fmt::Debug for DeleteController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteController")
            .field("pending", &*self.pending.borrow())
            .finish_non_exhaustive()
    }
}
