//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer only mutates state and returns effects; it never performs
//! I/O or spawns tasks itself.

use std::path::PathBuf;

use cafe_types::NewMessage;

use crate::common::TaskId;
use crate::features::compose::Draft;

#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Create a session, then report back with the draft for hand-off.
    SubmitDraft { task: TaskId, draft: Draft },

    /// Create an empty session from the sidebar.
    CreateSession { task: TaskId },

    /// Post the first message of a freshly created session.
    PostFirstMessage { message: NewMessage },

    /// Fetch one session with its messages.
    LoadSession { task: TaskId, id: String },

    /// Delete through the delete controller (guards duplicates).
    DeleteSession { id: String },

    /// Check that a user-entered path names a readable file.
    ResolveAttachment { task: TaskId, path: PathBuf },

    /// Flip the identity gate.
    SetIdentity { signed_in: bool },
}
