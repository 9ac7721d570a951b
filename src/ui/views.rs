//! View fragments: header, session list, transcript, input box.
//!
//! All fragments are pure render functions over a [`ChatView`] snapshot
//! plus the UI-local [`UiState`]; none of them hold state of their own.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use crate::api::Role;
use crate::state::ChatView;

use super::app::UiState;

/// Static header content derived from the configuration at startup.
#[derive(Clone, Debug)]
pub struct HeaderContext {
    /// Application title.
    pub title: String,
    /// Configured backend base URL.
    pub base_url: String,
    /// Derived link to the backend API docs.
    pub docs_url: String,
}

/// Render the whole screen.
pub fn draw(frame: &mut Frame<'_>, view: &ChatView, ui: &UiState, header: &HeaderContext) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(20)])
        .split(rows[1]);

    draw_header(frame, rows[0], header);
    draw_sessions(frame, columns[0], view);
    draw_transcript(frame, columns[1], view, ui);
    draw_input(frame, rows[2], view, ui);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, header: &HeaderContext) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", header.title),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("· "),
        Span::styled(header.base_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw("  docs: "),
        Span::styled(
            header.docs_url.clone(),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::UNDERLINED),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_sessions(frame: &mut Frame<'_>, area: Rect, view: &ChatView) {
    let (items, selected) = session_items(view);
    let title = if view.loading_sessions {
        " Sessions (loading…) "
    } else {
        " Sessions "
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    let mut state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut state);
}

/// Session list rows plus the index of the active session.
fn session_items(view: &ChatView) -> (Vec<ListItem<'static>>, Option<usize>) {
    let items = view
        .sessions
        .iter()
        .map(|session| {
            let title = if session.title.is_empty() {
                "Untitled"
            } else {
                &session.title
            };
            ListItem::new(Line::from(vec![
                Span::raw(title.to_string()),
                Span::styled(
                    format!("  ({})", session.message_count),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let selected = view
        .active_session
        .as_ref()
        .and_then(|active| view.sessions.iter().position(|s| s.id == active.id));
    (items, selected)
}

fn draw_transcript(frame: &mut Frame<'_>, area: Rect, view: &ChatView, ui: &UiState) {
    let lines = transcript_lines(view, ui.spinner());
    // Pin the view to the newest lines; wrapping can only add lines, so
    // this slightly over-scrolls rather than hiding the tail.
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;
    let title = view
        .active_session
        .as_ref()
        .map_or_else(|| " Transcript ".to_string(), |s| format!(" {} ", s.title));
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        area,
    );
}

/// Transcript body: one block of lines per entry, plus loading and typing
/// indicators.
pub(crate) fn transcript_lines(view: &ChatView, spinner: char) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if view.loading_messages {
        lines.push(Line::from(Span::styled(
            "Loading messages…",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for entry in &view.messages {
        let (label, color) = match entry.message.role {
            Role::User => ("You", Color::Yellow),
            Role::Assistant => ("Assistant", Color::Blue),
        };
        let mut heading = vec![Span::styled(
            format!("{label}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if entry.pending {
            heading.push(Span::styled(
                "  (sending…)",
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::from(heading));
        for text in entry.message.content.lines() {
            lines.push(Line::from(Span::raw(text.to_string())));
        }
        lines.push(Line::default());
    }

    if view.typing {
        lines.push(Line::from(Span::styled(
            format!("Assistant is typing {spinner}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}

fn draw_input(frame: &mut Frame<'_>, area: Rect, view: &ChatView, ui: &UiState) {
    let (title, title_style) = match &view.error {
        Some(error) => (
            format!(" {error} "),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        None => (
            " Enter send · Shift-Enter newline · ^N new · ^X delete · ^R refresh · Esc quit "
                .to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };
    let draft = if view.sending {
        format!("{} ⏳", ui.draft)
    } else {
        ui.draft.clone()
    };
    frame.render_widget(
        Paragraph::new(draft).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, title_style)),
        ),
        area,
    );
}
