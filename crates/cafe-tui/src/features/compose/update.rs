//! Compose reducer: key handling, submit and task results.

use cafe_types::NewMessage;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::PointerTarget;
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::events::ComposeUiEvent;
use crate::notices::NoticeKind;
use crate::render::PALETTE_MAX_ROWS;
use crate::state::TuiState;

/// Handles a key while the composer has focus.
pub fn handle_key(tui: &mut TuiState, key: KeyEvent) -> Vec<UiEffect> {
    let modifiers = key.modifiers;
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let alt = modifiers.contains(KeyModifiers::ALT);
    let shift = modifiers.contains(KeyModifiers::SHIFT);

    if tui.compose.is_palette_open()
        && let Some(effects) = handle_palette_key(tui, key)
    {
        return effects;
    }

    let compose = &mut tui.compose;
    match key.code {
        KeyCode::Enter if shift || alt => {
            compose.edit(|buf| buf.insert_newline());
            vec![]
        }
        KeyCode::Enter => submit(tui),
        KeyCode::Char('j') if ctrl => {
            compose.edit(|buf| buf.insert_newline());
            vec![]
        }
        KeyCode::Char(ch) if !ctrl && !alt => {
            compose.edit(|buf| buf.insert_char(ch));
            vec![]
        }
        KeyCode::Backspace => {
            compose.edit(|buf| buf.backspace());
            vec![]
        }
        KeyCode::Delete => {
            compose.edit(|buf| buf.delete());
            vec![]
        }
        KeyCode::Left => {
            compose.buffer.move_left();
            vec![]
        }
        KeyCode::Right => {
            compose.buffer.move_right();
            vec![]
        }
        KeyCode::Up => {
            compose.buffer.move_up();
            vec![]
        }
        KeyCode::Down => {
            compose.buffer.move_down();
            vec![]
        }
        KeyCode::Home => {
            compose.buffer.move_home();
            vec![]
        }
        KeyCode::End => {
            compose.buffer.move_end();
            vec![]
        }
        _ => vec![],
    }
}

/// Palette navigation. Returns `None` to fall through to plain editing.
fn handle_palette_key(tui: &mut TuiState, key: KeyEvent) -> Option<Vec<UiEffect>> {
    let compose = &mut tui.compose;
    match key.code {
        KeyCode::Up => compose.move_highlight(-1, PALETTE_MAX_ROWS),
        KeyCode::Down => compose.move_highlight(1, PALETTE_MAX_ROWS),
        KeyCode::Enter if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            return None;
        }
        // With nothing highlighted, Enter submits the draft as typed.
        KeyCode::Enter => {
            if !compose.select_highlighted() {
                return None;
            }
        }
        KeyCode::Tab => {
            compose.select_highlighted();
        }
        KeyCode::Esc => compose.dismiss_palette(),
        _ => return None,
    }
    Some(vec![])
}

pub fn handle_paste(tui: &mut TuiState, text: &str) {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    tui.compose.edit(|buf| buf.insert_str(&text));
}

pub fn handle_pointer(tui: &mut TuiState, target: PointerTarget) {
    tui.compose.pointer_down(target);
}

/// Starts a submit: blank drafts and duplicate submits are no-ops.
pub fn submit(tui: &mut TuiState) -> Vec<UiEffect> {
    if !tui.identity.is_ready() {
        tui.notices
            .push_local(NoticeKind::Error, "Sign in to create a cafe");
        return vec![];
    }
    if tui.tasks.state(TaskKind::ComposeSubmit).is_running() {
        return vec![];
    }
    let Some(draft) = tui.compose.draft() else {
        return vec![];
    };

    let task = tui.task_seq.next_id();
    tui.tasks.state_mut(TaskKind::ComposeSubmit).begin(task);
    vec![UiEffect::SubmitDraft { task, draft }]
}

pub fn handle_compose_event(tui: &mut TuiState, event: ComposeUiEvent) -> Vec<UiEffect> {
    if !tui.compose.mounted {
        return vec![];
    }

    match event {
        ComposeUiEvent::Created { session, draft } => {
            tui.compose.reset();
            tui.sessions.select(&session.id);
            vec![UiEffect::PostFirstMessage {
                message: NewMessage {
                    content: draft.text,
                    image_url: draft.image_url,
                    session_id: session.id,
                    model: draft.model,
                },
            }]
        }
        // The store already raised the error notice; the draft stays as typed.
        ComposeUiEvent::CreateFailed => vec![],
        ComposeUiEvent::AttachmentResolved { path } => {
            if let Err(err) = tui.compose.attach(&path) {
                tui.notices.push_local(NoticeKind::Error, err.to_string());
            }
            vec![]
        }
        ComposeUiEvent::AttachmentFailed { error } => {
            tui.notices.push_local(NoticeKind::Error, error);
            vec![]
        }
    }
}
