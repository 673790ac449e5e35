//! Sidebar and transcript state.
//!
//! The list is a mirror of the store's snapshots. Selection is kept by
//! session id, so snapshots that reorder or shrink the list never move it
//! onto a different session.

use std::collections::HashSet;

use cafe_types::{Session, SessionDetail};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailState {
    #[default]
    Empty,
    Loading {
        id: String,
    },
    Loaded(SessionDetail),
    Failed {
        id: String,
        error: String,
    },
}

impl DetailState {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            DetailState::Empty => None,
            DetailState::Loading { id } | DetailState::Failed { id, .. } => Some(id),
            DetailState::Loaded(detail) => Some(&detail.session.id),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionsState {
    pub list: Vec<Session>,
    pub pending: HashSet<String>,
    pub selected: Option<String>,
    pub detail: DetailState,
}

impl SessionsState {
    pub fn apply_snapshot(&mut self, list: Vec<Session>) {
        self.list = list;
        if let Some(selected) = &self.selected
            && !self.contains(selected)
        {
            self.selected = None;
        }
        if let Some(id) = self.detail.session_id()
            && !self.contains(id)
        {
            self.detail = DetailState::Empty;
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.list.iter().any(|s| s.id == id)
    }

    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_deref()?;
        self.list.iter().position(|s| s.id == id)
    }

    pub fn selected_session(&self) -> Option<&Session> {
        self.selected_index().map(|idx| &self.list[idx])
    }

    /// Moves the selection by `delta` rows, selecting the first row if none.
    pub fn move_selection(&mut self, delta: isize) {
        if self.list.is_empty() {
            self.selected = None;
            return;
        }
        let next = match self.selected_index() {
            Some(idx) => idx
                .saturating_add_signed(delta)
                .min(self.list.len() - 1),
            None => 0,
        };
        self.selected = Some(self.list[next].id.clone());
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains(id)
    }
}
