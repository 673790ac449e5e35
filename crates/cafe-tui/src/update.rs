//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::Instant;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::compose::{self, PointerTarget};
use crate::features::sessions;
use crate::overlays::{self, AttachPromptState, Overlay};
use crate::render::{self, AppLayout};
use crate::state::{AppState, Focus, TuiState};

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.tui.spinner_frame = app.tui.spinner_frame.wrapping_add(1);
            app.tui.notices.expire(Instant::now());
            vec![]
        }
        UiEvent::Frame { width, height } => {
            app.tui.viewport = (width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Identity(status) => {
            app.tui.identity = status;
            vec![]
        }
        UiEvent::SessionsChanged(list) => {
            app.tui.sessions.apply_snapshot(list);
            vec![]
        }
        UiEvent::PendingDeletesChanged(pending) => {
            app.tui.sessions.pending = pending;
            vec![]
        }
        UiEvent::Notice(notice) => {
            app.tui.notices.apply(notice);
            vec![]
        }
        UiEvent::TaskStarted { kind, started } => {
            app.tui.tasks.state_mut(kind).on_started(started);
            vec![]
        }
        UiEvent::TaskCompleted { kind, completed } => {
            let ok = app.tui.tasks.state_mut(kind).finish_if_active(completed.id);
            if ok {
                update(app, *completed.result)
            } else {
                tracing::debug!(?kind, task = completed.id.0, "Dropping stale task result");
                vec![]
            }
        }
        UiEvent::Compose(event) => compose::handle_compose_event(&mut app.tui, event),
        UiEvent::Session(event) => sessions::handle_session_event(&mut app.tui, event),
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => {
            if app.overlay.is_none() && app.tui.focus == Focus::Composer {
                compose::handle_paste(&mut app.tui, &text);
            }
            vec![]
        }
        Event::Mouse(mouse) if app.overlay.is_none() => handle_mouse(&mut app.tui, mouse),
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let tui = &mut app.tui;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return quit(tui);
    }
    if app.overlay.is_some() {
        return overlays::handle_overlay_key(&mut app.overlay, tui, key);
    }

    if ctrl {
        match key.code {
            KeyCode::Char('n') => return sessions::create_session(tui),
            KeyCode::Char('o') => {
                tui.compose.cycle_model();
                return vec![];
            }
            KeyCode::Char('p') => {
                tui.focus = Focus::Composer;
                tui.compose.open_commands();
                return vec![];
            }
            KeyCode::Char('a') => {
                app.overlay = Some(Overlay::AttachPrompt(AttachPromptState::new()));
                return vec![];
            }
            KeyCode::Char('x') => {
                tui.compose.clear_attachment();
                return vec![];
            }
            KeyCode::Char('l') => {
                return vec![UiEffect::SetIdentity {
                    signed_in: !tui.identity.is_ready(),
                }];
            }
            _ => {}
        }
    }

    let palette_owns_tab = tui.focus == Focus::Composer && tui.compose.is_palette_open();
    if key.code == KeyCode::Tab && !palette_owns_tab {
        tui.focus = tui.focus.toggled();
        return vec![];
    }

    match tui.focus {
        Focus::Composer => compose::handle_key(tui, key),
        Focus::Sidebar => {
            let (effects, overlay) = sessions::handle_key(tui, key);
            if overlay.is_some() {
                app.overlay = overlay;
            }
            effects
        }
    }
}

fn quit(tui: &mut TuiState) -> Vec<UiEffect> {
    tui.unmount();
    tui.should_quit = true;
    vec![UiEffect::Quit]
}

// ============================================================================
// Mouse
// ============================================================================

fn current_layout(tui: &TuiState) -> AppLayout {
    let (width, height) = tui.viewport;
    render::layout(tui, Rect::new(0, 0, width, height))
}

fn handle_mouse(tui: &mut TuiState, mouse: MouseEvent) -> Vec<UiEffect> {
    let layout = current_layout(tui);
    let pos = Position::new(mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let target = pointer_target(tui, &layout, pos);
            compose::handle_pointer(tui, target);
            if target == PointerTarget::Input {
                tui.focus = Focus::Composer;
                return vec![];
            }
            if target == PointerTarget::Outside && layout.sidebar.contains(pos) {
                tui.focus = Focus::Sidebar;
                if let Some(index) = sidebar_row(tui, layout.sidebar, pos) {
                    return sessions::click_row(tui, index);
                }
            }
            vec![]
        }
        MouseEventKind::Moved => {
            let hovered = match pointer_target(tui, &layout, pos) {
                PointerTarget::Palette(index) => index,
                PointerTarget::Input | PointerTarget::Outside => None,
            };
            tui.compose.set_hovered(hovered);
            vec![]
        }
        MouseEventKind::ScrollUp if layout.sidebar.contains(pos) => {
            tui.sessions.move_selection(-1);
            vec![]
        }
        MouseEventKind::ScrollDown if layout.sidebar.contains(pos) => {
            tui.sessions.move_selection(1);
            vec![]
        }
        _ => vec![],
    }
}

/// Classifies a pointer position against the composer and its palette.
pub fn pointer_target(tui: &TuiState, layout: &AppLayout, pos: Position) -> PointerTarget {
    if let Some(palette) = layout.palette
        && palette.contains(pos)
    {
        let first_row = palette.y + 1;
        let rows = palette.height.saturating_sub(2);
        if pos.y >= first_row && pos.y < first_row + rows {
            let scroll = tui.compose.palette.as_ref().map_or(0, |p| p.scroll);
            let index = scroll + usize::from(pos.y - first_row);
            if index < tui.compose.visible_commands().len() {
                return PointerTarget::Palette(Some(index));
            }
        }
        return PointerTarget::Palette(None);
    }
    if layout.popover.is_some_and(|rect| rect.contains(pos)) {
        return PointerTarget::Palette(None);
    }
    if layout.composer.contains(pos) {
        return PointerTarget::Input;
    }
    PointerTarget::Outside
}

/// Maps a click inside the sidebar to a list index.
///
/// Mirrors the list widget's scrolling: the selected row is kept in view.
fn sidebar_row(tui: &TuiState, sidebar: Rect, pos: Position) -> Option<usize> {
    let visible = usize::from(sidebar.height.saturating_sub(2));
    if visible == 0 || pos.y <= sidebar.y || pos.y >= sidebar.bottom().saturating_sub(1) {
        return None;
    }
    let offset = tui
        .sessions
        .selected_index()
        .map_or(0, |idx| (idx + 1).saturating_sub(visible));
    let index = offset + usize::from(pos.y - sidebar.y - 1);
    (index < tui.sessions.list.len()).then_some(index)
}

#[cfg(test)]
mod tests {
    use std::env;

    use cafe_core::IdentityStatus;
    use cafe_core::config::Config;
    use cafe_types::Session;
    use chrono::Utc;

    use super::*;
    use crate::common::commands::COMMANDS;
    use crate::common::{TaskCompleted, TaskKind};
    use crate::events::{ComposeUiEvent, SessionUiEvent};

    fn app() -> AppState {
        let mut app = AppState::new(&Config::default());
        app.tui.identity = IdentityStatus::signed_in("u1");
        update(
            &mut app,
            UiEvent::Frame {
                width: 120,
                height: 40,
            },
        );
        app
    }

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

    fn key(app: &mut AppState, code: KeyCode, modifiers: KeyModifiers) -> Vec<UiEffect> {
        update(
            app,
            UiEvent::Terminal(Event::Key(KeyEvent::new(code, modifiers))),
        )
    }

    fn type_text(app: &mut AppState, text: &str) {
        for ch in text.chars() {
            key(app, KeyCode::Char(ch), KeyModifiers::NONE);
        }
    }

    fn click(app: &mut AppState, column: u16, row: u16) -> Vec<UiEffect> {
        update(
            app,
            UiEvent::Terminal(Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                column,
                row,
                modifiers: KeyModifiers::NONE,
            })),
        )
    }

    #[test]
    fn test_create_result_after_quit_is_dropped() {
        let mut app = app();
        type_text(&mut app, "hello");
        let effects = key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        let Some(UiEffect::SubmitDraft { task, draft }) = effects.into_iter().next() else {
            panic!("expected submit");
        };

        key(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(app.tui.should_quit);

        let effects = update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::ComposeSubmit,
                completed: TaskCompleted {
                    id: task,
                    result: Box::new(UiEvent::Compose(ComposeUiEvent::Created {
                        session: session("c1", "New Cafe"),
                        draft,
                    })),
                },
            },
        );

        assert!(effects.is_empty());
        assert_eq!(app.tui.sessions.selected, None);
    }

    #[test]
    fn test_create_result_hands_off_first_message() {
        let mut app = app();
        type_text(&mut app, "hello");
        let effects = key(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        let Some(UiEffect::SubmitDraft { task, draft }) = effects.into_iter().next() else {
            panic!("expected submit");
        };

        let effects = update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::ComposeSubmit,
                completed: TaskCompleted {
                    id: task,
                    result: Box::new(UiEvent::Compose(ComposeUiEvent::Created {
                        session: session("c1", "New Cafe"),
                        draft,
                    })),
                },
            },
        );

        assert!(matches!(
            effects.as_slice(),
            [UiEffect::PostFirstMessage { message }] if message.session_id == "c1"
        ));
        assert!(!app.tui.tasks.state(TaskKind::ComposeSubmit).is_running());
    }

    #[test]
    fn test_sign_in_toggle() {
        let mut app = app();
        let effects = key(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SetIdentity { signed_in: false }]
        ));

        update(&mut app, UiEvent::Identity(IdentityStatus::signed_out()));
        let effects = key(&mut app, KeyCode::Char('l'), KeyModifiers::CONTROL);
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::SetIdentity { signed_in: true }]
        ));
    }

    #[test]
    fn test_delete_confirm_flow() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::SessionsChanged(vec![session("a", "Alpha"), session("b", "Beta")]),
        );
        key(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.tui.focus, Focus::Sidebar);
        key(&mut app, KeyCode::Down, KeyModifiers::NONE);
        key(&mut app, KeyCode::Down, KeyModifiers::NONE);

        key(&mut app, KeyCode::Char('d'), KeyModifiers::NONE);
        assert!(matches!(app.overlay, Some(Overlay::ConfirmDelete(_))));

        let effects = key(&mut app, KeyCode::Char('y'), KeyModifiers::NONE);
        assert!(app.overlay.is_none());
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::DeleteSession { id }] if id == "b"
        ));
    }

    #[test]
    fn test_click_on_palette_row_selects_command() {
        let mut app = app();
        type_text(&mut app, "/");
        let layout = current_layout(&app.tui);
        let palette = layout.palette.expect("palette open");

        click(&mut app, palette.x + 2, palette.y + 1 + 3);

        assert_eq!(app.tui.compose.buffer.text(), COMMANDS[3].prompt);
        assert!(!app.tui.compose.is_palette_open());
    }

    #[test]
    fn test_click_on_palette_border_keeps_it_open() {
        let mut app = app();
        type_text(&mut app, "/");
        let palette = current_layout(&app.tui).palette.expect("palette open");

        click(&mut app, palette.x, palette.y);

        assert!(app.tui.compose.is_palette_open());
        assert_eq!(app.tui.compose.buffer.text(), "/");
    }

    #[test]
    fn test_click_outside_dismisses_palette() {
        let mut app = app();
        type_text(&mut app, "/abc");

        click(&mut app, 1, 1);

        assert!(!app.tui.compose.is_palette_open());
        assert_eq!(app.tui.compose.buffer.text(), "abc");
    }

    #[test]
    fn test_hover_drives_popover_command() {
        let mut app = app();
        type_text(&mut app, "/");
        let palette = current_layout(&app.tui).palette.expect("palette open");

        update(
            &mut app,
            UiEvent::Terminal(Event::Mouse(MouseEvent {
                kind: MouseEventKind::Moved,
                column: palette.x + 2,
                row: palette.y + 2,
                modifiers: KeyModifiers::NONE,
            })),
        );

        assert_eq!(
            app.tui.compose.detail_command().map(|c| c.id),
            Some(COMMANDS[1].id)
        );
    }

    #[test]
    fn test_sidebar_click_selects_and_loads() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::SessionsChanged(vec![session("a", "Alpha"), session("b", "Beta")]),
        );
        let sidebar = current_layout(&app.tui).sidebar;

        let effects = click(&mut app, sidebar.x + 2, sidebar.y + 2);

        assert_eq!(app.tui.sessions.selected.as_deref(), Some("b"));
        assert!(matches!(
            effects.as_slice(),
            [UiEffect::LoadSession { id, .. }] if id == "b"
        ));
    }

    #[test]
    fn test_stale_load_result_is_ignored() {
        let mut app = app();
        update(
            &mut app,
            UiEvent::SessionsChanged(vec![session("a", "Alpha"), session("b", "Beta")]),
        );
        app.tui.sessions.select("a");
        let first = sessions::open_selected(&mut app.tui);
        app.tui.sessions.select("b");
        let second = sessions::open_selected(&mut app.tui);
        let (Some(UiEffect::LoadSession { task: old, .. }), Some(UiEffect::LoadSession { .. })) =
            (first.into_iter().next(), second.into_iter().next())
        else {
            panic!("expected loads");
        };

        update(
            &mut app,
            UiEvent::TaskCompleted {
                kind: TaskKind::SessionLoad,
                completed: TaskCompleted {
                    id: old,
                    result: Box::new(UiEvent::Session(SessionUiEvent::DetailFailed {
                        id: "a".to_string(),
                        error: "boom".to_string(),
                    })),
                },
            },
        );

        assert!(app.tui.tasks.state(TaskKind::SessionLoad).is_running());
        assert_eq!(app.tui.sessions.detail.session_id(), Some("b"));
    }

    #[test]
    fn test_attach_shortcut_opens_prompt() {
        let mut app = app();
        key(&mut app, KeyCode::Char('a'), KeyModifiers::CONTROL);
        assert!(matches!(app.overlay, Some(Overlay::AttachPrompt(_))));

        key(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.overlay.is_none());
    }

    #[test]
    fn test_attachment_result_after_quit_is_dropped() {
        let mut app = app();
        app.tui.unmount();

        let effects = compose::handle_compose_event(
            &mut app.tui,
            ComposeUiEvent::AttachmentResolved {
                path: env::temp_dir().join("shot.png"),
            },
        );

        assert!(effects.is_empty());
        assert!(app.tui.compose.attachment.is_none());
        assert_eq!(app.tui.compose.previews.created(), 0);
        assert_eq!(app.tui.compose.previews.live_count(), 0);
    }
}
