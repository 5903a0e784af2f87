//! The rolling event log panel.
//!
//! Renders a window over the append-only log: the newest lines when
//! following the tail, or an older window when scrolled back. The log
//! itself is never truncated; only the viewport is capped.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let viewport = area.height.saturating_sub(2) as usize;
    let len = app.log.len();

    let scrollback = app.log_scrollback.min(len.saturating_sub(1));
    let end = len - scrollback;
    let start = end.saturating_sub(viewport);

    let lines: Vec<Line> = app.log[start..end]
        .iter()
        .map(|entry| {
            let text_style = if entry.text.starts_with("ERROR:") {
                Style::default().fg(app.theme.error)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(
                    entry.stamp.format("%H:%M:%S ").to_string(),
                    Style::default().add_modifier(Modifier::DIM),
                ),
                Span::styled(entry.text.clone(), text_style),
            ])
        })
        .collect();

    let title = if app.following() {
        " Event Log ".to_string()
    } else {
        format!(" Event Log [{}-{}/{}] ", start + 1, end, len)
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
