// Filter bar component
//
// One field per filter the active view supports. While editing, the focused
// field is highlighted and shows a cursor.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(dashboard) = app.dashboard.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let view = dashboard.active();
    let editing = app.editing_filter_key();

    let mut spans = Vec::new();
    for key in view.filter_keys() {
        let value = dashboard.filter_value(view, *key).unwrap_or("");
        let focused = editing == Some(*key);

        spans.push(Span::styled(
            format!(" {}: ", key.param()),
            Style::default().fg(theme.muted),
        ));
        let (text, style) = match (value.is_empty(), focused) {
            (true, false) => (
                key.label().to_string(),
                Style::default()
                    .fg(theme.muted)
                    .add_modifier(Modifier::ITALIC),
            ),
            (_, true) => (
                format!("{}▏", value),
                Style::default()
                    .fg(theme.selection_fg)
                    .bg(theme.selection),
            ),
            (false, false) => (value.to_string(), Style::default().fg(theme.foreground)),
        };
        spans.push(Span::styled(text, style));
        spans.push(Span::raw("  "));
    }

    let border = if editing.is_some() {
        theme.panel_filters
    } else {
        theme.border
    };
    let title = if editing.is_some() {
        " Filters [editing] "
    } else {
        " Filters (/) "
    };

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    f.render_widget(bar, area);
}
