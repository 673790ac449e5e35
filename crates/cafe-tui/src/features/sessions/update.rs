//! Sidebar reducer.

use crossterm::event::{KeyCode, KeyEvent};

use super::state::DetailState;
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::SessionUiEvent;
use crate::notices::NoticeKind;
use crate::overlays::{ConfirmDeleteState, Overlay};
use crate::state::TuiState;

/// Handles a key while the sidebar has focus.
///
/// Returns an overlay to open (delete confirmation) alongside effects.
pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> (Vec<UiEffect>, Option<Overlay>) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            tui.sessions.move_selection(-1);
            (vec![], None)
        }
        KeyCode::Down | KeyCode::Char('j') => {
            tui.sessions.move_selection(1);
            (vec![], None)
        }
        KeyCode::Enter => (open_selected(tui), None),
        KeyCode::Delete | KeyCode::Char('d') => (vec![], confirm_delete(tui)),
        KeyCode::Char('n') => (create_session(tui), None),
        _ => (vec![], None),
    }
}

/// Selects the row at `index` and loads it.
pub fn click_row(tui: &mut TuiState, index: usize) -> Vec<UiEffect> {
    let Some(id) = tui.sessions.list.get(index).map(|s| s.id.clone()) else {
        return vec![];
    };
    tui.sessions.select(&id);
    open_selected(tui)
}

/// Loads the selected session's transcript.
pub fn open_selected(tui: &mut TuiState) -> Vec<UiEffect> {
    let Some(id) = tui.sessions.selected.clone() else {
        return vec![];
    };
    load(tui, id)
}

pub(crate) fn load(tui: &mut TuiState, id: String) -> Vec<UiEffect> {
    if !tui.identity.is_ready() {
        return vec![];
    }
    let task = tui.task_seq.next_id();
    tui.tasks.state_mut(TaskKind::SessionLoad).begin(task);
    tui.sessions.detail = DetailState::Loading { id: id.clone() };
    vec![UiEffect::LoadSession { task, id }]
}

/// Creates an empty session (no draft).
pub fn create_session(tui: &mut TuiState) -> Vec<UiEffect> {
    if !tui.identity.is_ready() {
        tui.notices
            .push_local(NoticeKind::Error, "Sign in to create a cafe");
        return vec![];
    }
    if tui.tasks.state(TaskKind::SessionCreate).is_running() {
        return vec![];
    }
    let task = tui.task_seq.next_id();
    tui.tasks.state_mut(TaskKind::SessionCreate).begin(task);
    vec![UiEffect::CreateSession { task }]
}

fn confirm_delete(tui: &TuiState) -> Option<Overlay> {
    let session = tui.sessions.selected_session()?;
    if tui.sessions.is_pending(&session.id) {
        return None;
    }
    Some(Overlay::ConfirmDelete(ConfirmDeleteState::new(session)))
}

pub fn handle_session_event(tui: &mut TuiState, event: SessionUiEvent) -> Vec<UiEffect> {
    match event {
        SessionUiEvent::Created { session } => {
            tui.sessions.select(&session.id);
            load(tui, session.id)
        }
        SessionUiEvent::CreateFailed => vec![],
        SessionUiEvent::DetailLoaded { detail } => {
            if tui.sessions.selected.as_deref() == Some(detail.session.id.as_str()) {
                tui.sessions.detail = DetailState::Loaded(detail);
            }
            vec![]
        }
        SessionUiEvent::DetailFailed { id, error } => {
            tui.sessions.detail = DetailState::Failed { id, error };
            vec![]
        }
        SessionUiEvent::MessagePosted { session_id } => {
            if tui.sessions.selected.as_deref() == Some(session_id.as_str()) {
                load(tui, session_id)
            } else {
                vec![]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cafe_core::IdentityStatus;
    use cafe_core::config::Config;
    use cafe_types::{Session, SessionDetail};
    use chrono::Utc;
    use crossterm::event::KeyModifiers;

    use super::*;

    fn session(id: &str, name: &str) -> Session {
        let now = Utc::now();
        Session {
            id: id.to_string(),
            name: name.to_string(),
            owner_principal_id: "u1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn tui_with(names: &[(&str, &str)]) -> TuiState {
        let mut tui = TuiState::new(&Config::default());
        tui.identity = IdentityStatus::signed_in("u1");
        tui.sessions
            .apply_snapshot(names.iter().map(|(id, name)| session(id, name)).collect());
        tui
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_delete_key_opens_confirmation_naming_session() {
        let mut tui = tui_with(&[("a", "Alpha"), ("b", "Beta")]);
        tui.sessions.select("b");

        let (effects, overlay) = handle_key(&mut tui, press(KeyCode::Char('d')));

        assert!(effects.is_empty());
        match overlay {
            Some(Overlay::ConfirmDelete(confirm)) => {
                assert_eq!(confirm.id, "b");
                assert!(confirm.prompt().contains("\"Beta\""));
            }
            other => panic!("expected confirmation, got {other:?}"),
        }
    }

    #[test]
    fn test_pending_session_cannot_be_deleted_again() {
        let mut tui = tui_with(&[("a", "Alpha")]);
        tui.sessions.select("a");
        tui.sessions.pending.insert("a".to_string());

        let (_, overlay) = handle_key(&mut tui, press(KeyCode::Delete));
        assert!(overlay.is_none());
    }

    #[test]
    fn test_enter_loads_selected() {
        let mut tui = tui_with(&[("a", "Alpha")]);
        tui.sessions.move_selection(1);

        let (effects, _) = handle_key(&mut tui, press(KeyCode::Enter));

        assert!(matches!(effects.as_slice(), [UiEffect::LoadSession { id, .. }] if id == "a"));
        assert_eq!(
            tui.sessions.detail,
            DetailState::Loading {
                id: "a".to_string()
            }
        );
    }

    #[test]
    fn test_detail_for_other_session_is_ignored() {
        let mut tui = tui_with(&[("a", "Alpha"), ("b", "Beta")]);
        tui.sessions.select("a");

        handle_session_event(
            &mut tui,
            SessionUiEvent::DetailLoaded {
                detail: SessionDetail {
                    session: session("b", "Beta"),
                    messages: Vec::new(),
                },
            },
        );
        assert_eq!(tui.sessions.detail, DetailState::Empty);
    }

    #[test]
    fn test_create_requires_sign_in() {
        let mut tui = tui_with(&[]);
        tui.identity = IdentityStatus::signed_out();
        assert!(create_session(&mut tui).is_empty());
    }
}
