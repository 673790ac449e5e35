//! Sidebar and transcript rendering.

use cafe_types::Sender;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::state::{DetailState, SessionsState};
use crate::common::text::truncate_with_ellipsis;

const SPINNER: [&str; 4] = ["⠋", "⠙", "⠹", "⠸"];

pub fn render_sidebar(
    frame: &mut Frame,
    sessions: &SessionsState,
    area: Rect,
    focused: bool,
    spinner_frame: usize,
) {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" Cafes ({}) ", sessions.list.len()));

    if sessions.list.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No cafes yet. Ctrl+N to start one.",
                Style::default().fg(Color::DarkGray),
            ))
            .wrap(Wrap { trim: true })
            .block(block),
            area,
        );
        return;
    }

    let name_width = (area.width as usize).saturating_sub(6);
    let items: Vec<ListItem> = sessions
        .list
        .iter()
        .map(|session| {
            let pending = sessions.is_pending(&session.id);
            let marker = if pending {
                SPINNER[spinner_frame % SPINNER.len()]
            } else {
                " "
            };
            let name_style = if pending {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker} "), Style::default().fg(Color::Yellow)),
                Span::styled(truncate_with_ellipsis(&session.name, name_width), name_style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default().with_selected(sessions.selected_index());
    frame.render_stateful_widget(list, area, &mut state);
}

pub fn render_transcript(frame: &mut Frame, sessions: &SessionsState, area: Rect) {
    let title = sessions
        .selected_session()
        .map_or_else(|| " Cafe ".to_string(), |s| format!(" {} ", s.name));
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title);

    let dim = Style::default().fg(Color::DarkGray);
    let lines: Vec<Line> = match &sessions.detail {
        DetailState::Empty => vec![Line::from(Span::styled(
            "Select a cafe or describe something new below.",
            dim,
        ))],
        DetailState::Loading { .. } => vec![Line::from(Span::styled("Loading…", dim))],
        DetailState::Failed { error, .. } => vec![Line::from(Span::styled(
            format!("Could not load cafe: {error}"),
            Style::default().fg(Color::Red),
        ))],
        DetailState::Loaded(detail) if detail.messages.is_empty() => {
            vec![Line::from(Span::styled("No messages yet.", dim))]
        }
        DetailState::Loaded(detail) => {
            let mut lines = Vec::new();
            for message in &detail.messages {
                let color = match message.sender {
                    Sender::User => Color::Cyan,
                    Sender::Assistant => Color::Magenta,
                };
                let label = message.sender.label();
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{label}: "),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(message.created_at.format("%H:%M").to_string(), dim),
                ]));
                lines.extend(message.content.lines().map(|l| Line::from(l.to_string())));
                if let Some(url) = &message.image_url {
                    lines.push(Line::from(Span::styled(format!("[image] {url}"), dim)));
                }
                lines.push(Line::from(""));
            }
            lines
        }
    };

    // Tail of the transcript stays visible.
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
        area,
    );
}
