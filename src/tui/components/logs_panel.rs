//! Logs panel component
//!
//! Shows the newest entries of the in-memory log buffer, colored by level.
//! Always follows the tail; the panel is for glancing, the file log is for
//! reading.

use crate::logging::LogEntry;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let visible = area.height.saturating_sub(2) as usize;
    let entries = app.log_buffer.tail(visible);

    let items: Vec<ListItem> = entries
        .iter()
        .map(|entry| ListItem::new(format_log_entry(entry, theme)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.panel_logs))
            .title(format!(" System Logs ({}) ", app.log_buffer.len())),
    );
    f.render_widget(list, area);
}

fn format_log_entry<'a>(entry: &'a LogEntry, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            entry.timestamp.format("%H:%M:%S ").to_string(),
            Style::default().fg(theme.muted),
        ),
        Span::styled(
            format!("{:<5} ", entry.level.as_str()),
            Style::default().fg(theme.log_level(entry.level)),
        ),
        Span::styled(
            format!("{} ", module(&entry.target)),
            Style::default().fg(theme.border),
        ),
        Span::styled(entry.message.as_str(), Style::default().fg(theme.foreground)),
    ])
}

/// `nybot_admin::live` -> `live`
fn module(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}
