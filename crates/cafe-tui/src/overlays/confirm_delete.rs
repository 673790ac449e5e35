//! Delete confirmation.

use cafe_types::Session;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::{OverlayUpdate, centered};
use crate::effects::UiEffect;

#[derive(Debug, Clone)]
pub struct ConfirmDeleteState {
    pub id: String,
    pub name: String,
}

impl ConfirmDeleteState {
    pub fn new(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            name: session.name.clone(),
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            "Delete \"{}\"? This action cannot be undone.",
            self.name
        )
    }

    pub fn handle_key(&self, key: KeyEvent) -> OverlayUpdate {
        match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                OverlayUpdate::close().with_ui_effects(vec![UiEffect::DeleteSession {
                    id: self.id.clone(),
                }])
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rect = centered(area, 50, 6);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(" Delete cafe ");
        let body = vec![
            Line::from(self.prompt()),
            Line::from(""),
            Line::from(Span::styled(
                "y / Enter to delete · n / Esc to cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        frame.render_widget(
            Paragraph::new(body).block(block).wrap(Wrap { trim: true }),
            rect,
        );
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::overlays::OverlayTransition;

    fn state() -> ConfirmDeleteState {
        ConfirmDeleteState {
            id: "c1".to_string(),
            name: "Todo App".to_string(),
        }
    }

    #[test]
    fn test_confirm_emits_delete() {
        let update = state().handle_key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE));
        assert_eq!(update.transition, OverlayTransition::Close);
        assert!(matches!(
            update.effects.as_slice(),
            [UiEffect::DeleteSession { id }] if id == "c1"
        ));
    }

    #[test]
    fn test_cancel_emits_nothing() {
        let update = state().handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(update.transition, OverlayTransition::Close);
        assert!(update.effects.is_empty());
    }

    #[test]
    fn test_other_keys_keep_dialog_open() {
        let update = state().handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE));
        assert_eq!(update.transition, OverlayTransition::Stay);
    }

    #[test]
    fn test_prompt_names_session() {
        assert_eq!(
            state().prompt(),
            "Delete \"Todo App\"? This action cannot be undone."
        );
    }
}
