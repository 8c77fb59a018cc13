// Modal overlays: help and user detail
//
// Both render into a centered rect on top of the dashboard after clearing it.

use super::formatters::{format_timestamp, truncate};
use crate::models::UserDetail;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const HELP: &[(&str, &str)] = &[
    ("1 2 3 / F1-F3", "Users, Greetings, Messages"),
    ("Tab / Shift-Tab", "Next / previous view"),
    ("/", "Edit filters (Tab: next field, Enter/Esc: done)"),
    ("x", "Clear filters of this view"),
    ("↑ ↓", "Select row"),
    ("[ ]", "Previous / next page"),
    ("r / F5", "Reload view and totals"),
    ("Enter", "User detail (Users view)"),
    ("y", "Copy selected row as JSON"),
    ("l", "Toggle system logs"),
    ("L", "Log out"),
    ("q", "Quit"),
];

/// Centered rect taking `percent_x` × `percent_y` of `area`
fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn frame_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.highlight))
        .style(Style::default().bg(theme.background))
        .title(title)
}

pub fn render_help(f: &mut Frame, area: Rect, theme: &Theme) {
    let popup = centered(area, 60, 60);
    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<16}", keys),
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(*action, Style::default().fg(theme.foreground)),
            ])
        })
        .collect();

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(frame_block(" Keys (Esc to close) ", theme)),
        popup,
    );
}

pub fn render_user_detail(f: &mut Frame, area: Rect, app: &App, tg_user_id: i64, scroll: u16) {
    let theme = &app.theme;
    let popup = centered(area, 80, 80);

    let detail = app
        .dashboard
        .as_ref()
        .and_then(|d| d.detail())
        .filter(|d| d.user.tg_user_id == tg_user_id);
    let lines = match detail {
        Some(detail) => detail_lines(detail, theme, popup.width.saturating_sub(30) as usize),
        None => vec![Line::from(Span::styled(
            format!(" {} loading…", app.spinner_char()),
            Style::default().fg(theme.muted),
        ))],
    };

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(frame_block(" User (y copy, Esc close) ", theme)),
        popup,
    );
}

fn detail_lines<'a>(detail: &'a UserDetail, theme: &Theme, text_width: usize) -> Vec<Line<'a>> {
    let user = &detail.user;
    let label = Style::default().fg(theme.muted);
    let heading = Style::default()
        .fg(theme.title)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(" id        ", label),
            Span::raw(user.tg_user_id.to_string()),
        ]),
        Line::from(vec![
            Span::styled(" name      ", label),
            Span::raw(user.display_name().unwrap_or_else(|| "—".to_string())),
        ]),
        Line::from(vec![
            Span::styled(" username  ", label),
            Span::raw(
                user.username
                    .as_deref()
                    .map(|u| format!("@{}", u))
                    .unwrap_or_else(|| "—".to_string()),
            ),
        ]),
        Line::from(vec![
            Span::styled(" seen      ", label),
            Span::raw(format!(
                "{} → {}",
                format_timestamp(&user.first_seen_at),
                format_timestamp(&user.last_seen_at)
            )),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Greetings ({})", user.greetings_count),
            heading,
        )),
    ];

    if detail.greetings.is_empty() {
        lines.push(Line::from(Span::styled("   none", label)));
    }
    for greeting in &detail.greetings {
        lines.push(Line::from(vec![
            Span::styled(format!("   {}  ", format_timestamp(&greeting.sent_at)), label),
            Span::raw(truncate(&greeting.greeting_text, text_width)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" Messages ({})", detail.messages.len()),
        heading,
    )));
    if detail.messages.is_empty() {
        lines.push(Line::from(Span::styled("   none", label)));
    }
    for message in &detail.messages {
        lines.push(Line::from(vec![
            Span::styled(
                format!(
                    "   {}  {:<8} ",
                    format_timestamp(&message.received_at),
                    message.message_type
                ),
                label,
            ),
            Span::raw(
                message
                    .message_text
                    .as_deref()
                    .map(|t| truncate(t, text_width))
                    .unwrap_or_default(),
            ),
        ]));
    }

    lines
}
