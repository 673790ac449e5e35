//! Composer, palette and detail popover rendering.

use std::time::Duration;

use cafe_core::models;
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use super::state::ComposeState;
use crate::common::text::{hard_wrap, truncate_with_ellipsis};

const PLACEHOLDER: &str = "Describe what you want to build... (/ for commands)";

/// Renders the input box. `focused` places the terminal cursor.
///
/// `submitting` carries the elapsed time of an in-flight submit.
pub fn render_composer(
    frame: &mut Frame,
    compose: &ComposeState,
    area: Rect,
    focused: bool,
    submitting: Option<Duration>,
) {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let mut title = vec![Span::styled(
        format!(" {} ", models::display_name(&compose.model)),
        Style::default().fg(Color::Magenta),
    )];
    if let Some(attachment) = &compose.attachment {
        title.push(Span::styled(
            format!("📎 {} ", truncate_with_ellipsis(&attachment.label, 24)),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(elapsed) = submitting {
        title.push(Span::styled(
            format!("creating… {}s ", elapsed.as_secs()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if compose.buffer.is_blank() && compose.buffer.lines().len() == 1 {
        let placeholder = Paragraph::new(Line::from(Span::styled(
            truncate_with_ellipsis(PLACEHOLDER, inner.width as usize),
            Style::default().fg(Color::DarkGray),
        )));
        frame.render_widget(placeholder, inner);
    }

    let width = inner.width as usize;
    let mut rows: Vec<Line<'static>> = Vec::new();
    let (cursor_row, cursor_col) = compose.buffer.cursor();
    let mut cursor_at = (0u16, 0u16);
    for (idx, line) in compose.buffer.lines().iter().enumerate() {
        let wrapped = hard_wrap(line, width);
        if idx == cursor_row {
            let before: String = line.chars().take(cursor_col).collect();
            let col = before.width();
            let (extra_rows, x) = if width == 0 {
                (0, 0)
            } else {
                (col / width, col % width)
            };
            cursor_at = ((rows.len() + extra_rows) as u16, x as u16);
        }
        rows.extend(wrapped.into_iter().map(Line::from));
    }

    // Keep the cursor row in view.
    let visible = inner.height as usize;
    let skip = (cursor_at.0 as usize + 1).saturating_sub(visible);
    if !compose.buffer.is_blank() || compose.buffer.lines().len() > 1 {
        let shown: Vec<Line<'static>> = rows.into_iter().skip(skip).take(visible).collect();
        frame.render_widget(Paragraph::new(shown), inner);
    }

    if focused {
        frame.set_cursor_position(Position::new(
            inner.x + cursor_at.1.min(inner.width.saturating_sub(1)),
            inner.y + cursor_at.0.saturating_sub(skip as u16),
        ));
    }
}

/// Renders the slash palette above the composer.
pub fn render_palette(frame: &mut Frame, compose: &ComposeState, area: Rect) {
    let Some(palette) = compose.palette.as_ref() else {
        return;
    };
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Commands ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let commands = compose.visible_commands();
    if commands.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No matching commands",
                Style::default().fg(Color::DarkGray),
            )),
            inner,
        );
        return;
    }

    let title_width = commands.iter().map(|c| c.title.width()).max().unwrap_or(0);
    let items: Vec<ListItem> = commands
        .iter()
        .enumerate()
        .skip(palette.scroll)
        .take(inner.height as usize)
        .map(|(idx, cmd)| {
            let selected = idx == palette.highlighted;
            let hovered = palette.hovered == Some(cmd.id);
            let title_style = if selected {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else if hovered {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if selected { "› " } else { "  " };
            let remaining = (inner.width as usize).saturating_sub(title_width + 4);
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Magenta)),
                Span::styled(format!("{:<title_width$}  ", cmd.title), title_style),
                Span::styled(
                    truncate_with_ellipsis(cmd.description, remaining),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items), inner);
}

/// Renders the full prompt of the hovered (or highlighted) command.
pub fn render_popover(frame: &mut Frame, compose: &ComposeState, area: Rect) {
    let Some(command) = compose.detail_command() else {
        return;
    };
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {} ", command.title));
    let body = vec![
        Line::from(Span::styled(
            command.description,
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(command.prompt),
    ];
    frame.render_widget(
        Paragraph::new(body).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
