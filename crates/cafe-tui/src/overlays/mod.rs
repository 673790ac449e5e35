//! Modal overlays.
//!
//! Each overlay owns its state, key handler and render function. While one
//! is open it takes all keyboard input.
//!
//! - `confirm_delete.rs`: yes/no confirmation before deleting a session
//! - `attach_prompt.rs`: path entry for the composer attachment

pub mod attach_prompt;
pub mod confirm_delete;

pub use attach_prompt::AttachPromptState;
pub use confirm_delete::ConfirmDeleteState;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};

use crate::effects::UiEffect;
use crate::state::TuiState;

// ============================================================================
// OverlayTransition / OverlayUpdate
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTransition {
    Stay,
    Close,
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

// ============================================================================
// Overlay
// ============================================================================

#[derive(Debug)]
pub enum Overlay {
    ConfirmDelete(ConfirmDeleteState),
    AttachPrompt(AttachPromptState),
}

impl Overlay {
    pub fn handle_key(&mut self, tui: &mut TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::ConfirmDelete(state) => state.handle_key(key),
            Overlay::AttachPrompt(state) => state.handle_key(tui, key),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Overlay::ConfirmDelete(state) => state.render(frame, area),
            Overlay::AttachPrompt(state) => state.render(frame, area),
        }
    }
}

/// Routes a key to the open overlay and applies its transition.
pub fn handle_overlay_key(
    overlay: &mut Option<Overlay>,
    tui: &mut TuiState,
    key: KeyEvent,
) -> Vec<UiEffect> {
    let Some(current) = overlay.as_mut() else {
        return vec![];
    };
    let update = current.handle_key(tui, key);
    if update.transition == OverlayTransition::Close {
        *overlay = None;
    }
    update.effects
}

/// A centered rect of fixed size, clamped to `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}
