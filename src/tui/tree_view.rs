//! Panel tables for the operational and degraded trees

use super::widgets::{name_cell, status_symbol};
use crate::engine::Panel;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

/// Draw one section panel.
///
/// `state` selects into [`Panel::rows`] and keeps the selected row scrolled
/// into view. Only the focused panel highlights its selection.
pub fn draw_panel(frame: &mut Frame, area: Rect, panel: &Panel, focused: bool, state: &mut TableState) {
    let marker = if panel.expanded { "▾" } else { "▸" };
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} {} ({}) ", marker, panel.section.title(), panel.rows.len()))
        .border_style(Style::default().fg(border));

    if let Some(placeholder) = panel.placeholder {
        let text = Paragraph::new(placeholder)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let header = Row::new(vec!["Name", "Status", "Latency", "Detail"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows = panel.rows.iter().map(|row| {
        let status = match row.status {
            Some(status) => {
                let (symbol, color) = status_symbol(status);
                Cell::from(format!("{} {}", symbol, status.as_str())).style(Style::default().fg(color))
            },
            None => Cell::from(""),
        };

        let detail_style = if row.verified {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::ITALIC)
        } else {
            Style::default().fg(Color::Gray)
        };

        let name_style = if row.depth == 0 {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from(name_cell(row)).style(name_style),
            status,
            Cell::from(row.latency.clone().unwrap_or_default()),
            Cell::from(row.detail.clone()).style(detail_style),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block);

    let table = if focused {
        table.row_highlight_style(Style::default().bg(Color::DarkGray))
    } else {
        table
    };

    frame.render_stateful_widget(table, area, state);
}
