//! Events fed to the reducer.
//!
//! Terminal input, ticks, watch-channel snapshots from the core, and task
//! results posted to the inbox by effect handlers.

use std::collections::HashSet;
use std::path::PathBuf;

use cafe_core::IdentityStatus;
use cafe_core::notice::Notice;
use cafe_types::{Session, SessionDetail};
use crossterm::event::Event;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};
use crate::features::compose::Draft;

#[derive(Debug)]
pub enum UiEvent {
    Tick,
    Frame {
        width: u16,
        height: u16,
    },
    Terminal(Event),
    Identity(IdentityStatus),
    SessionsChanged(Vec<Session>),
    PendingDeletesChanged(HashSet<String>),
    Notice(Notice),
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
    Compose(ComposeUiEvent),
    Session(SessionUiEvent),
}

#[derive(Debug)]
pub enum ComposeUiEvent {
    /// The session exists; the draft is handed off as its first message.
    Created { session: Session, draft: Draft },
    CreateFailed,
    AttachmentResolved { path: PathBuf },
    AttachmentFailed { error: String },
}

#[derive(Debug)]
pub enum SessionUiEvent {
    Created { session: Session },
    CreateFailed,
    DetailLoaded { detail: SessionDetail },
    DetailFailed { id: String, error: String },
    MessagePosted { session_id: String },
}
