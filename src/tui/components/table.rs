// Collection table component
//
// Renders the active view's page. Columns depend on the terminal width;
// free-text columns are truncated by display width.

use super::formatters::{format_timestamp, truncate};
use crate::dashboard::{Dashboard, ViewKind};
use crate::models::{Greeting, Message, User};
use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

/// Column layout of one view at one width
struct Columns {
    headers: Vec<&'static str>,
    widths: Vec<Constraint>,
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(dashboard) = app.dashboard.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let view = dashboard.active();
    let bp = Breakpoint::from_width(area.width);
    // Room left for the widest free-text column
    let text_width = (area.width as usize).saturating_sub(40).max(10);

    let (columns, rows) = match view {
        ViewKind::Users => (
            user_columns(bp),
            dashboard
                .users()
                .page()
                .iter()
                .map(|u| user_row(u, bp))
                .collect::<Vec<_>>(),
        ),
        ViewKind::Greetings => (
            greeting_columns(),
            dashboard
                .greetings()
                .page()
                .iter()
                .map(|g| greeting_row(g, text_width))
                .collect(),
        ),
        ViewKind::Messages => (
            message_columns(bp),
            dashboard
                .messages()
                .page()
                .iter()
                .map(|m| message_row(m, bp, text_width))
                .collect(),
        ),
    };

    let header = Row::new(columns.headers.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(theme.title)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(rows, columns.widths)
        .header(header)
        .row_highlight_style(
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.panel_table))
                .title(title(dashboard, view))
                .title_bottom(Line::from(" [ prev │ next ] ").right_aligned()),
        );

    let mut state = TableState::default();
    if dashboard.row_count(view) > 0 {
        state.select(Some(app.selected_row()));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn title(dashboard: &Dashboard, view: ViewKind) -> String {
    let page = dashboard.offset(view);
    let mut title = if page > 0 {
        format!(" {} (from #{})", view.title(), page + 1)
    } else {
        format!(" {}", view.title())
    };
    if dashboard.is_stale(view) {
        title.push_str(" [stale]");
    }
    title.push(' ');
    title
}

fn user_columns(bp: Breakpoint) -> Columns {
    if bp.at_least(Breakpoint::Normal) {
        Columns {
            headers: vec!["tg_user_id", "name", "username", "greetings", "first seen", "last seen"],
            widths: vec![
                Constraint::Length(12),
                Constraint::Min(16),
                Constraint::Length(18),
                Constraint::Length(9),
                Constraint::Length(14),
                Constraint::Length(14),
            ],
        }
    } else {
        Columns {
            headers: vec!["tg_user_id", "name", "greetings"],
            widths: vec![
                Constraint::Length(12),
                Constraint::Min(10),
                Constraint::Length(9),
            ],
        }
    }
}

fn user_row(user: &User, bp: Breakpoint) -> Row<'static> {
    let name = user.display_name().unwrap_or_else(|| "—".to_string());
    if bp.at_least(Breakpoint::Normal) {
        Row::new(vec![
            user.tg_user_id.to_string(),
            truncate(&name, 32),
            user.username
                .as_deref()
                .map(|u| format!("@{}", truncate(u, 16)))
                .unwrap_or_default(),
            user.greetings_count.to_string(),
            format_timestamp(&user.first_seen_at),
            format_timestamp(&user.last_seen_at),
        ])
    } else {
        Row::new(vec![
            user.tg_user_id.to_string(),
            truncate(&name, 20),
            user.greetings_count.to_string(),
        ])
    }
}

fn greeting_columns() -> Columns {
    Columns {
        headers: vec!["sent", "tg_user_id", "greeting"],
        widths: vec![
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    }
}

fn greeting_row(greeting: &Greeting, text_width: usize) -> Row<'static> {
    Row::new(vec![
        format_timestamp(&greeting.sent_at),
        greeting.tg_user_id.to_string(),
        truncate(&greeting.greeting_text, text_width),
    ])
}

fn message_columns(bp: Breakpoint) -> Columns {
    if bp.at_least(Breakpoint::Normal) {
        Columns {
            headers: vec!["received", "tg_user_id", "type", "text"],
            widths: vec![
                Constraint::Length(14),
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Min(10),
            ],
        }
    } else {
        Columns {
            headers: vec!["tg_user_id", "type", "text"],
            widths: vec![
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Min(8),
            ],
        }
    }
}

fn message_row(message: &Message, bp: Breakpoint, text_width: usize) -> Row<'static> {
    let text = message
        .message_text
        .as_deref()
        .map(|t| truncate(t, text_width))
        .unwrap_or_default();
    if bp.at_least(Breakpoint::Normal) {
        Row::new(vec![
            format_timestamp(&message.received_at),
            message.tg_user_id.to_string(),
            message.message_type.clone(),
            text,
        ])
    } else {
        Row::new(vec![
            message.tg_user_id.to_string(),
            truncate(&message.message_type, 8),
            text,
        ])
    }
}
