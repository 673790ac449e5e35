//! Top-level rendering.
//!
//! `render` is a pure function of `AppState`. `layout` is shared with the
//! reducer so mouse hit-testing uses the same rectangles that were drawn.

use std::time::Duration;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::TaskKind;
use crate::common::text::truncate_with_ellipsis;
use crate::features::compose::{render_composer, render_palette, render_popover};
use crate::features::notices::NoticeKind;
use crate::features::sessions::{render_sidebar, render_transcript};
use crate::state::{AppState, Focus, TuiState};

pub const SIDEBAR_WIDTH: u16 = 30;
pub const STATUS_HEIGHT: u16 = 1;
/// Palette rows shown before it scrolls.
pub const PALETTE_MAX_ROWS: usize = 8;
pub const PALETTE_WIDTH: u16 = 44;
const POPOVER_WIDTH: u16 = 40;

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppLayout {
    pub sidebar: Rect,
    pub transcript: Rect,
    pub composer: Rect,
    pub status: Rect,
    /// Present only while the palette is open.
    pub palette: Option<Rect>,
    pub popover: Option<Rect>,
}

pub fn layout(tui: &TuiState, area: Rect) -> AppLayout {
    let [body, status] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(STATUS_HEIGHT)]).areas(area);
    let sidebar_width = SIDEBAR_WIDTH.min(body.width / 3);
    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(sidebar_width), Constraint::Min(1)]).areas(body);

    let composer_height = tui
        .compose
        .height(main.width.saturating_sub(2), main.height)
        .min(main.height);
    let [transcript, composer] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(composer_height)]).areas(main);

    let mut palette = None;
    let mut popover = None;
    if tui.compose.is_palette_open() {
        let rows = tui.compose.visible_commands().len().clamp(1, PALETTE_MAX_ROWS) as u16;
        let height = (rows + 2).min(transcript.height);
        let width = PALETTE_WIDTH.min(main.width);
        if height > 2 {
            let rect = Rect::new(
                composer.x,
                composer.y.saturating_sub(height),
                width,
                height,
            );
            palette = Some(rect);

            if tui.compose.detail_command().is_some() {
                let right_space = main.right().saturating_sub(rect.right());
                popover = if right_space >= 20 {
                    Some(Rect::new(
                        rect.right(),
                        rect.y,
                        POPOVER_WIDTH.min(right_space),
                        rect.height,
                    ))
                } else {
                    None
                };
            }
        }
    }

    AppLayout {
        sidebar,
        transcript,
        composer,
        status,
        palette,
        popover,
    }
}

pub fn render(state: &AppState, frame: &mut Frame) {
    let tui = &state.tui;
    let area = frame.area();
    let layout = layout(tui, area);

    render_sidebar(
        frame,
        &tui.sessions,
        layout.sidebar,
        tui.focus == Focus::Sidebar && state.overlay.is_none(),
        tui.spinner_frame,
    );
    render_transcript(frame, &tui.sessions, layout.transcript);
    render_composer(
        frame,
        &tui.compose,
        layout.composer,
        tui.focus == Focus::Composer && state.overlay.is_none(),
        submit_elapsed(tui),
    );
    if let Some(rect) = layout.palette {
        render_palette(frame, &tui.compose, rect);
    }
    if let Some(rect) = layout.popover {
        render_popover(frame, &tui.compose, rect);
    }
    render_status(frame, tui, layout.status);

    if let Some(overlay) = &state.overlay {
        overlay.render(frame, area);
    }
}

fn submit_elapsed(tui: &TuiState) -> Option<Duration> {
    let state = tui.tasks.state(TaskKind::ComposeSubmit);
    state
        .is_running()
        .then(|| state.elapsed().unwrap_or_default())
}

fn render_status(frame: &mut Frame, tui: &TuiState, area: Rect) {
    let identity = if !tui.identity.loaded {
        Span::styled("…", Style::default().fg(Color::DarkGray))
    } else if let Some(principal) = tui.identity.principal_id.as_deref() {
        Span::styled(principal.to_string(), Style::default().fg(Color::Green))
    } else {
        Span::styled("signed out", Style::default().fg(Color::Red))
    };
    let right = Line::from(vec![
        identity,
        Span::raw(" · "),
        Span::styled(tui.compose.model.clone(), Style::default().fg(Color::Magenta)),
        Span::raw(" "),
    ]);
    let right_width = u16::try_from(right.width()).unwrap_or(area.width);

    let [left_area, right_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(right_width.min(area.width)),
    ])
    .areas(area);

    let left = match tui.notices.latest() {
        Some(entry) => {
            let (prefix, color) = match entry.kind {
                NoticeKind::Loading => (SPINNER[tui.spinner_frame % SPINNER.len()], Color::Yellow),
                NoticeKind::Success => ("✓", Color::Green),
                NoticeKind::Error => ("✗", Color::Red),
            };
            Line::from(Span::styled(
                truncate_with_ellipsis(
                    &format!(" {prefix} {}", entry.message),
                    left_area.width as usize,
                ),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            truncate_with_ellipsis(
                " Tab focus · Ctrl+N new · Ctrl+O model · Ctrl+A attach · Ctrl+L sign in/out · Ctrl+C quit",
                left_area.width as usize,
            ),
            Style::default().fg(Color::DarkGray),
        )),
    };

    frame.render_widget(Paragraph::new(left), left_area);
    frame.render_widget(Paragraph::new(right), right_area);
}

#[cfg(test)]
mod tests {
    use cafe_core::config::Config;

    use super::*;

    #[test]
    fn test_palette_sits_above_composer() {
        let mut tui = TuiState::new(&Config::default());
        tui.compose.edit(|buf| buf.insert_char('/'));

        let layout = layout(&tui, Rect::new(0, 0, 120, 40));
        let palette = layout.palette.expect("palette open");

        assert_eq!(palette.bottom(), layout.composer.y);
        assert_eq!(palette.height as usize, PALETTE_MAX_ROWS + 2);
        assert!(layout.popover.is_some());
    }

    #[test]
    fn test_no_palette_when_closed() {
        let tui = TuiState::new(&Config::default());
        let layout = layout(&tui, Rect::new(0, 0, 80, 24));
        assert!(layout.palette.is_none());
        assert_eq!(layout.status.height, STATUS_HEIGHT);
    }
}
