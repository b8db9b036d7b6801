//! Glyphs and colors shared by the dashboard views.

use crate::engine::render::{Expander, NodeKind, NodeRow};
use crate::engine::{AggregateStatus, EngineStatus};
use ratatui::style::Color;

/// Badge symbol and color for an aggregate status.
pub fn status_symbol(status: AggregateStatus) -> (&'static str, Color) {
    match status {
        AggregateStatus::Online => ("●", Color::Green),
        AggregateStatus::Degraded => ("⚠", Color::Yellow),
        AggregateStatus::Offline => ("✖", Color::Red),
    }
}

/// Color of the engine label.
pub fn engine_color(status: EngineStatus) -> Color {
    match status {
        EngineStatus::Starting | EngineStatus::Fetching => Color::Cyan,
        EngineStatus::Synced => Color::Green,
        EngineStatus::Syncing(_) => Color::Yellow,
        EngineStatus::Offline => Color::Red,
    }
}

/// Short protocol glyph for a check row.
pub fn check_glyph(check_type: &str) -> &'static str {
    let upper = check_type.to_ascii_uppercase();
    if upper.starts_with("PING") {
        "◉"
    } else if upper.starts_with("TCP") {
        "⇄"
    } else if upper.starts_with("UDP") {
        "⇢"
    } else {
        "·"
    }
}

/// Indented name column with expander or check glyph.
pub fn name_cell(row: &NodeRow) -> String {
    let indent = "  ".repeat(row.depth);
    let marker = match (row.expander, row.kind) {
        (Expander::Open, _) => "▾",
        (Expander::Closed, _) => "▸",
        (Expander::Leaf, NodeKind::Check) => check_glyph(&row.label),
        (Expander::Leaf, _) => " ",
    };
    format!("{}{} {}", indent, marker, row.label)
}
