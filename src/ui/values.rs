//! The latest-readings panel.
//!
//! Shows the most recent snapshot as a label/value table. Two empty
//! states are rendered distinctly: never polled yet, and a successful
//! poll whose response matched none of the configured fields.

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, LinkState};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Sensor Values ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let Some(snapshot) = app.snapshot.as_ref() else {
        let placeholder = Paragraph::new("\nNo sensor data available yet")
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    if snapshot.is_empty() {
        let placeholder =
            Paragraph::new("\nSensor online: no recognized fields in the last response")
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::DIM))
                .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let value_style = if app.link == LinkState::Down {
        Style::default().fg(app.theme.error)
    } else {
        Style::default()
    };

    let label_width = snapshot.iter().map(|(label, _)| label.len() as u16).max().unwrap_or(10);

    let rows: Vec<Row> = snapshot
        .iter()
        .map(|(label, value)| {
            Row::new(vec![
                ratatui::text::Text::styled(label.to_string(), app.theme.header),
                ratatui::text::Text::styled(value.to_string(), value_style),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(label_width + 1), Constraint::Min(10)])
        .column_spacing(1)
        .block(block);

    frame.render_widget(table, area);
}
