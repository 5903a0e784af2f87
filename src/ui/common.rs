//! Common UI components shared across the dashboard.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, LinkState};

/// Render the header bar with the sensor link state and poll settings.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let indicator = match app.link {
        LinkState::Unknown => "○",
        LinkState::Up | LinkState::Down => "●",
    };

    let line = Line::from(vec![
        Span::styled(format!(" {} ", indicator), app.theme.link_style(app.link)),
        Span::styled("AQWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::raw(app.target.clone()),
        Span::raw(" │ profile: "),
        Span::styled(app.profile.label(), Style::default().fg(app.theme.highlight)),
        Span::raw(format!(" │ every {}s", app.interval.as_secs())),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows: time since last poll outcome, attempt count, available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(last) = app.last_update {
        let scroll_hint = if app.following() {
            String::new()
        } else {
            format!("SCROLLBACK {} | ", app.log_scrollback)
        };
        format!(
            " Updated {:.1}s ago | {} attempts | {}↑↓:scroll End:follow ?:help q:quit",
            last.elapsed().as_secs_f64(),
            app.attempts,
            scroll_hint,
        )
    } else {
        " Waiting for first poll... | ?:help q:quit".to_string()
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Event Log",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ↑/↓ j/k     Scroll one line"),
        Line::from("  PgUp/PgDn   Scroll 10 lines"),
        Line::from("  Home        Jump to oldest entry"),
        Line::from("  End         Follow the newest entries"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ?           Toggle this help"),
        Line::from("  q Ctrl-C    Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 18u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
