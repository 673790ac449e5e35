//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── identity: IdentityStatus   (mirror of the identity gate)
//! │   ├── compose: ComposeState      (draft, palette, attachment)
//! │   ├── sessions: SessionsState    (sidebar list, pending deletes, transcript)
//! │   ├── notices: NoticeState       (status-line toasts)
//! │   ├── task_seq / tasks           (async task lifecycle)
//! │   └── focus, viewport, spinner
//! └── overlay: Option<Overlay>       (modal overlays)
//! ```
//!
//! Overlay handlers get `&mut Overlay` and `&mut TuiState` at the same time
//! because the two live in separate fields.

use cafe_core::IdentityStatus;
use cafe_core::config::Config;

use crate::common::{TaskKind, TaskSeq, Tasks};
use crate::features::compose::ComposeState;
use crate::features::notices::NoticeState;
use crate::features::sessions::SessionsState;
use crate::overlays::Overlay;

pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            tui: TuiState::new(config),
            overlay: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Composer,
}

impl Focus {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Focus::Sidebar => Focus::Composer,
            Focus::Composer => Focus::Sidebar,
        }
    }
}

#[derive(Debug)]
pub struct TuiState {
    pub should_quit: bool,
    pub identity: IdentityStatus,
    pub focus: Focus,
    pub compose: ComposeState,
    pub sessions: SessionsState,
    pub notices: NoticeState,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
    /// Terminal size as (width, height).
    pub viewport: (u16, u16),
}

impl TuiState {
    pub fn new(config: &Config) -> Self {
        Self {
            should_quit: false,
            identity: IdentityStatus::loading(),
            focus: Focus::Composer,
            compose: ComposeState::new(&config.model, config.composer),
            sessions: SessionsState::default(),
            notices: NoticeState::default(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
            viewport: (0, 0),
        }
    }

    /// Tears the composer down: releases its preview URL and orphans its
    /// in-flight tasks so late completions are dropped.
    pub fn unmount(&mut self) {
        self.compose.unmount();
        self.tasks.state_mut(TaskKind::ComposeSubmit).clear();
        self.tasks.state_mut(TaskKind::AttachmentResolve).clear();
    }
}
