//! Attachment path prompt.

use std::env;
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use super::{OverlayUpdate, centered};
use crate::common::TaskKind;
use crate::common::text::truncate_with_ellipsis;
use crate::effects::UiEffect;
use crate::state::TuiState;

#[derive(Debug, Clone, Default)]
pub struct AttachPromptState {
    pub input: String,
}

impl AttachPromptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, tui: &mut TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Enter => {
                let path = self.input.trim();
                if path.is_empty() {
                    return OverlayUpdate::close();
                }
                let task = tui.task_seq.next_id();
                tui.tasks.state_mut(TaskKind::AttachmentResolve).begin(task);
                OverlayUpdate::close().with_ui_effects(vec![UiEffect::ResolveAttachment {
                    task,
                    path: expand_home(path),
                }])
            }
            KeyCode::Backspace => {
                self.input.pop();
                OverlayUpdate::stay()
            }
            KeyCode::Char('u') if ctrl => {
                self.input.clear();
                OverlayUpdate::stay()
            }
            KeyCode::Char(ch) if !ctrl => {
                self.input.push(ch);
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rect = centered(area, 60, 5);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Attach image ");
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let width = inner.width as usize;
        let shown = if self.input.width() >= width {
            let skip = self.input.chars().count().saturating_sub(width.saturating_sub(1));
            self.input.chars().skip(skip).collect::<String>()
        } else {
            self.input.clone()
        };
        let body = vec![
            Line::from(shown.clone()),
            Line::from(""),
            Line::from(Span::styled(
                truncate_with_ellipsis("Enter to attach · Esc to cancel", width),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(Paragraph::new(body), inner);

        let x = u16::try_from(shown.width()).unwrap_or(u16::MAX);
        frame.set_cursor_position(Position::new(
            inner.x + x.min(inner.width.saturating_sub(1)),
            inner.y,
        ));
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = env::var_os("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use cafe_core::config::Config;

    use super::*;
    use crate::overlays::OverlayTransition;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_enter_resolves_typed_path() {
        let mut tui = TuiState::new(&Config::default());
        let mut prompt = AttachPromptState::new();
        for ch in "/tmp/shot.png".chars() {
            prompt.handle_key(&mut tui, press(KeyCode::Char(ch)));
        }

        let update = prompt.handle_key(&mut tui, press(KeyCode::Enter));

        assert_eq!(update.transition, OverlayTransition::Close);
        assert!(matches!(
            update.effects.as_slice(),
            [UiEffect::ResolveAttachment { path, .. }] if path == &PathBuf::from("/tmp/shot.png")
        ));
        assert!(tui.tasks.state(TaskKind::AttachmentResolve).is_running());
    }

    #[test]
    fn test_blank_input_just_closes() {
        let mut tui = TuiState::new(&Config::default());
        let mut prompt = AttachPromptState::new();

        let update = prompt.handle_key(&mut tui, press(KeyCode::Enter));

        assert_eq!(update.transition, OverlayTransition::Close);
        assert!(update.effects.is_empty());
    }
}
