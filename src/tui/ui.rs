// UI rendering - screen composition
//
// Login screen, or the dashboard shell:
//
//   ┌ title bar ───────────────────┐
//   │ filter bar (if the view has filters)
//   │ table            │ logs (l) │
//   └ status bar ──────────────────┘

use crate::tui::app::{App, LoginField, Screen};
use crate::tui::components::{
    filter_bar, logs_panel, overlays, status_bar, table, title_bar,
};
use crate::tui::modal::Modal;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();
    match app.screen {
        Screen::Login => draw_login(f, area, app),
        Screen::Dashboard => draw_dashboard(f, area, app),
    }

    if let Some(toast) = &app.toast {
        toast.render(f, area, &app.theme);
    }
}

fn draw_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let has_filters = !app.active_view().filter_keys().is_empty();
    let [title_area, filter_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(if has_filters { 3 } else { 0 }),
        Constraint::Min(5),
        Constraint::Length(2),
    ])
    .areas(area);

    title_bar::render(f, title_area, app);
    if has_filters {
        filter_bar::render(f, filter_area, app);
    }

    if app.show_logs {
        let [table_area, logs_area] =
            Layout::vertical([Constraint::Percentage(65), Constraint::Percentage(35)])
                .areas(body_area);
        table::render(f, table_area, app);
        logs_panel::render(f, logs_area, app);
    } else {
        table::render(f, body_area, app);
    }

    status_bar::render(f, status_area, app);

    match &app.modal {
        Some(Modal::Help) => overlays::render_help(f, area, &app.theme),
        Some(Modal::UserDetail { tg_user_id, scroll }) => {
            overlays::render_user_detail(f, area, app, *tg_user_id, *scroll)
        }
        None => {}
    }
}

fn draw_login(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let form = &app.login_form;

    let [row] = Layout::vertical([Constraint::Length(10)])
        .flex(Flex::Center)
        .areas(area);
    let [panel] = Layout::horizontal([Constraint::Length(50)])
        .flex(Flex::Center)
        .areas(row);

    let field = |label: &'static str, value: String, focused: bool| {
        let style = if focused {
            Style::default()
                .fg(theme.selection_fg)
                .bg(theme.selection)
        } else {
            Style::default().fg(theme.foreground)
        };
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(format!("  {:<10}", label), Style::default().fg(theme.muted)),
            Span::styled(format!("{}{}", value, cursor), style),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        field(
            "login",
            form.login.clone(),
            form.focus == LoginField::Login,
        ),
        Line::from(""),
        field(
            "password",
            "•".repeat(form.password.chars().count()),
            form.focus == LoginField::Password,
        ),
        Line::from(""),
    ];

    let status = if form.busy {
        Span::styled(
            format!("  {} signing in…", app.spinner_char()),
            Style::default().fg(theme.warning),
        )
    } else if let Some(error) = &form.error {
        Span::styled(format!("  ✗ {}", error), Style::default().fg(theme.error))
    } else {
        Span::styled(
            "  Enter sign in │ Tab switch │ Esc quit",
            Style::default().fg(theme.muted),
        )
    };
    lines.push(Line::from(status));

    let login = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.title))
            .title(Span::styled(
                " nybot-admin ",
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(login, panel);
}
