// Title bar component
//
// View tabs on the left; totals and live channel state on the right.

use super::formatters::format_number;
use crate::dashboard::{Dashboard, ViewKind};
use crate::live::ConnectionState;
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
    let active = dashboard.active();

    let mut spans = vec![Span::styled(
        " nybot-admin ",
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    )];
    for (i, view) in ViewKind::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, view.title());
        let style = if *view == active {
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(label, style));
    }

    let state = dashboard.connection_state();
    let right = Line::from(vec![
        Span::styled(totals(dashboard), Style::default().fg(theme.muted)),
        Span::raw("  "),
        Span::styled(
            format!("● {} ", connection_label(state)),
            Style::default().fg(theme.connection(state)),
        ),
    ])
    .right_aligned();

    let login = app
        .session_login
        .as_deref()
        .map(|l| Line::from(format!(" {} ", l)).left_aligned());

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.title))
        .title_top(Line::from(" ? ").right_aligned());
    if let Some(login) = login {
        block = block.title_bottom(login);
    }

    let title = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(title, area);

    // Totals share the inner row with the tabs, drawn from the right edge
    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2).min(1),
    };
    f.render_widget(Paragraph::new(right), inner);
}

fn totals(dashboard: &Dashboard) -> String {
    match dashboard.stats() {
        Some(stats) => format!(
            "users {} │ greetings {} │ messages {}",
            format_number(stats.total_users),
            format_number(stats.total_greetings),
            format_number(stats.total_messages)
        ),
        None => String::new(),
    }
}

fn connection_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connected => "live",
        ConnectionState::Connecting => "connecting",
        ConnectionState::Disconnected => "offline",
    }
}
