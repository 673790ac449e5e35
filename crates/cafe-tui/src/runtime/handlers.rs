//! Effect handlers.
//!
//! Each handler is an async function that performs the I/O for one effect
//! and returns the event to feed back to the reducer. Spawning and task
//! bookkeeping live in the runtime.

use std::io;
use std::path::{Path, PathBuf};

use cafe_core::{DeleteController, DeleteOutcome, SessionStore};
use cafe_types::NewMessage;

use crate::events::{ComposeUiEvent, SessionUiEvent, UiEvent};
use crate::features::compose::Draft;

/// Creates a session for a composer draft.
pub async fn submit_draft(store: &SessionStore, draft: Draft) -> UiEvent {
    match store.create().await {
        Ok(session) => UiEvent::Compose(ComposeUiEvent::Created { session, draft }),
        Err(err) => {
            tracing::warn!(error = %err, "Draft submit failed");
            UiEvent::Compose(ComposeUiEvent::CreateFailed)
        }
    }
}

pub async fn create_session(store: &SessionStore) -> UiEvent {
    match store.create().await {
        Ok(session) => UiEvent::Session(SessionUiEvent::Created { session }),
        Err(err) => {
            tracing::warn!(error = %err, "Session create failed");
            UiEvent::Session(SessionUiEvent::CreateFailed)
        }
    }
}

pub async fn load_session(store: &SessionStore, id: String) -> UiEvent {
    match store.load_detail(&id).await {
        Ok(detail) => UiEvent::Session(SessionUiEvent::DetailLoaded { detail }),
        Err(err) => UiEvent::Session(SessionUiEvent::DetailFailed {
            id,
            error: err.to_string(),
        }),
    }
}

/// Posts the first message of a new session.
///
/// Failures are already surfaced as notices by the store.
pub async fn post_first_message(store: &SessionStore, message: NewMessage) -> Option<UiEvent> {
    store.post_message(&message).await.ok().map(|_| {
        UiEvent::Session(SessionUiEvent::MessagePosted {
            session_id: message.session_id,
        })
    })
}

/// Deletes through the controller. The pending set and the store snapshot
/// reach the UI through their watch channels.
pub async fn delete_session(deletes: &DeleteController, id: &str) {
    match deletes.request_delete(id).await {
        DeleteOutcome::Skipped => tracing::debug!(session_id = %id, "Delete skipped"),
        DeleteOutcome::Deleted(_) | DeleteOutcome::Failed(_) => {}
    }
}

/// Checks that `path` names a regular file and returns its absolute path.
pub async fn resolve_attachment(path: PathBuf) -> UiEvent {
    match canonical_file(&path).await {
        Ok(path) => UiEvent::Compose(ComposeUiEvent::AttachmentResolved { path }),
        Err(err) => UiEvent::Compose(ComposeUiEvent::AttachmentFailed {
            error: format!("Cannot attach {}: {err}", path.display()),
        }),
    }
}

async fn canonical_file(path: &Path) -> io::Result<PathBuf> {
    let canonical = tokio::fs::canonicalize(path).await?;
    let metadata = tokio::fs::metadata(&canonical).await?;
    if !metadata.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a file"));
    }
    Ok(canonical)
}
