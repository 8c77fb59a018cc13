// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, dashboard events)
// - Login / logout, which are awaited on the loop between frames

pub mod app;
pub mod clipboard;
pub mod components;
pub mod layout;
pub mod modal;
pub mod theme;
pub mod ui;

use crate::config::Config;
use crate::dashboard::{Dashboard, DashboardEvent, ViewKind};
use crate::logging::LogBuffer;
use crate::models::SessionInfo;
use crate::session::{login_error_message, SessionGate};
use crate::transport::SharedTransport;
use anyhow::{Context, Result};
use app::{Action, App, LoginField, Screen};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use modal::{Modal, ModalAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Run the TUI until the operator quits
pub async fn run_tui(config: Config, transport: SharedTransport, log_buffer: LogBuffer) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut session = Session::new(config, transport);
    let mut app = App::new(log_buffer, &session.config.login);

    let result = run_event_loop(&mut terminal, &mut app, &mut session).await;

    // Stop the live channel before the terminal is restored
    if let Some(mut dashboard) = app.dashboard.take() {
        dashboard.shutdown().await;
    }

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Server session plumbing shared by login and logout
struct Session {
    config: Config,
    transport: SharedTransport,
    gate: SessionGate,
    /// Dashboard events of the current session
    events: Option<mpsc::Receiver<DashboardEvent>>,
}

impl Session {
    fn new(config: Config, transport: SharedTransport) -> Self {
        let gate = SessionGate::new(transport.clone());
        Self {
            config,
            transport,
            gate,
            events: None,
        }
    }

    /// Build a dashboard for a freshly established session
    fn start(&mut self, app: &mut App, info: SessionInfo) {
        let (mut dashboard, events) = Dashboard::new(self.transport.clone(), self.config.page_size);
        match self.config.live_config() {
            Some(live) => dashboard.start_live(live),
            None => tracing::warn!(
                "Cannot derive a live channel URL from {}; push updates disabled",
                self.config.api_url
            ),
        }
        dashboard.activate(ViewKind::Users);
        dashboard.refresh_stats();

        self.events = Some(events);
        app.enter_dashboard(info.login, dashboard);
    }

    async fn login(&mut self, app: &mut App) {
        let login = app.login_form.login.trim().to_string();
        let password = app.login_form.password.clone();
        match self.gate.login(&login, &password).await {
            Ok(info) => self.start(app, info),
            Err(e) => {
                tracing::warn!("Login failed: {}", e);
                app.login_form.busy = false;
                app.login_form.password.clear();
                app.login_form.error = Some(login_error_message(&e));
            }
        }
    }

    async fn logout(&mut self, app: &mut App) {
        // Channel and dispatch go first; anything still queued is dropped
        self.events = None;
        let message = match app.dashboard.take() {
            Some(mut dashboard) => match dashboard.logout(&self.gate).await {
                Ok(()) => "Logged out".to_string(),
                Err(e) => {
                    tracing::warn!("Logout request failed: {}", e);
                    "Logged out locally (server unreachable)".to_string()
                }
            },
            None => "Logged out".to_string(),
        };
        app.enter_login(None);
        app.show_toast(message);
    }
}

/// Main event loop
///
/// Waits on three sources with tokio::select!:
/// 1. Keyboard input
/// 2. Timer ticks (spinner, toast expiry, redraw)
/// 3. Dashboard events (fetch results, push-driven reloads)
async fn run_event_loop(terminal: &mut Term, app: &mut App, session: &mut Session) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    // An existing session cookie skips the login screen
    terminal
        .draw(|f| ui::draw(f, app))
        .context("Failed to draw terminal")?;
    if let Some(info) = session.gate.probe().await {
        tracing::info!("Resuming session for {}", info.login);
        session.start(app, info);
    }

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        let action = tokio::select! {
            key = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => Some(key_event),
                        _ => None,
                    }
                } else {
                    None
                }
            } => match key {
                Some(key_event) => handle_key_event(app, key_event),
                None => Action::None,
            },

            _ = tick_interval.tick() => {
                app.tick();
                Action::None
            }

            Some(event) = next_event(&mut session.events) => {
                if let Some(dashboard) = app.dashboard.as_mut() {
                    let update = dashboard.handle(event);
                    app.on_update(&update);
                }
                Action::None
            }
        };

        match action {
            Action::None => {}
            Action::Quit => break,
            Action::Login => {
                app.login_form.busy = true;
                app.login_form.error = None;
                terminal
                    .draw(|f| ui::draw(f, app))
                    .context("Failed to draw terminal")?;
                session.login(app).await;
            }
            Action::Logout => session.logout(app).await,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Next dashboard event; pending forever while logged out
async fn next_event(events: &mut Option<mpsc::Receiver<DashboardEvent>>) -> Option<DashboardEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Handle keyboard input
/// Layered dispatch: Ctrl-C → Modal → Screen → Filter editor → Dashboard keys
fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Action {
    if key_event.kind != KeyEventKind::Press {
        return Action::None;
    }
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match app.screen {
        Screen::Login => handle_login_keys(app, key_event),
        Screen::Dashboard => {
            if handle_modal_input(app, &key_event) {
                return Action::None;
            }
            if app.filter_editor.is_some() {
                handle_filter_keys(app, &key_event);
                return Action::None;
            }
            handle_dashboard_keys(app, &key_event)
        }
    }
}

fn handle_login_keys(app: &mut App, key_event: KeyEvent) -> Action {
    let form = &mut app.login_form;
    if form.busy {
        return Action::None;
    }
    match key_event.code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_focus(),
        KeyCode::Enter => {
            if form.can_submit() {
                return Action::Login;
            }
            if form.login.trim().is_empty() {
                form.focus = LoginField::Login;
            } else {
                form.focus = LoginField::Password;
            }
        }
        KeyCode::Backspace => {
            form.focused_mut().pop();
        }
        KeyCode::Char(c) => {
            form.error = None;
            form.focused_mut().push(c);
        }
        _ => {}
    }
    Action::None
}

/// Handle modal input - returns true if a modal absorbed the input
fn handle_modal_input(app: &mut App, key_event: &KeyEvent) -> bool {
    let Some(modal) = app.modal.as_mut() else {
        return false;
    };

    let is_detail = matches!(modal, Modal::UserDetail { .. });
    match modal.handle_input(key_event.code) {
        ModalAction::None | ModalAction::ScrollUp | ModalAction::ScrollDown => {}
        ModalAction::Close => {
            app.modal = None;
            if is_detail {
                if let Some(dashboard) = app.dashboard.as_mut() {
                    dashboard.close_user_detail();
                }
            }
        }
        ModalAction::Copy => {
            let detail = app.dashboard.as_ref().and_then(Dashboard::detail);
            if let Some(detail) = detail {
                let message = match clipboard::copy_json(detail) {
                    Ok(()) => "✓ Copied user JSON to clipboard",
                    Err(_) => "✗ Failed to copy",
                };
                app.show_toast(message);
            }
        }
    }

    true
}

fn handle_filter_keys(app: &mut App, key_event: &KeyEvent) {
    match key_event.code {
        KeyCode::Esc | KeyCode::Enter => app.filter_editor = None,
        KeyCode::Tab | KeyCode::BackTab => app.next_filter_field(),
        KeyCode::Backspace => app.edit_filter(|v| {
            v.pop();
        }),
        KeyCode::Char(c) => app.edit_filter(|v| v.push(c)),
        _ => {}
    }
}

fn handle_dashboard_keys(app: &mut App, key_event: &KeyEvent) -> Action {
    let view = app.active_view();

    match key_event.code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('L') => return Action::Logout,
        KeyCode::Char('?') => app.modal = Some(Modal::Help),
        KeyCode::Char('1') | KeyCode::F(1) => app.select_view(ViewKind::Users),
        KeyCode::Char('2') | KeyCode::F(2) => app.select_view(ViewKind::Greetings),
        KeyCode::Char('3') | KeyCode::F(3) => app.select_view(ViewKind::Messages),
        KeyCode::Tab => app.select_view(view.next()),
        KeyCode::BackTab => app.select_view(view.prev()),
        KeyCode::Char('/') => {
            if !app.begin_filter_edit() {
                app.show_toast(format!("{} has no filters", view.title()));
            }
        }
        KeyCode::Char('x') => {
            if let Some(dashboard) = app.dashboard.as_mut() {
                dashboard.clear_filters(view);
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Char('[') => {
            if let Some(dashboard) = app.dashboard.as_mut() {
                dashboard.prev_page(view);
            }
        }
        KeyCode::Char(']') => {
            if let Some(dashboard) = app.dashboard.as_mut() {
                dashboard.next_page(view);
            }
        }
        KeyCode::Char('r') | KeyCode::F(5) => {
            if let Some(dashboard) = app.dashboard.as_mut() {
                dashboard.clear_error();
                dashboard.refresh();
            }
        }
        KeyCode::Enter => {
            if let Some(id) = app.selected_user_id() {
                if let Some(dashboard) = app.dashboard.as_mut() {
                    dashboard.open_user_detail(id);
                }
                app.modal = Some(Modal::user_detail(id));
            }
        }
        KeyCode::Char('y') => {
            if let Some(record) = app.selected_record_json() {
                let message = match clipboard::copy_json(&record) {
                    Ok(()) => "✓ Copied row JSON to clipboard",
                    Err(_) => "✗ Failed to copy",
                };
                app.show_toast(message);
            }
        }
        KeyCode::Char('l') => app.show_logs = !app.show_logs,
        KeyCode::Esc => {
            if let Some(dashboard) = app.dashboard.as_mut() {
                dashboard.clear_error();
            }
        }
        _ => {}
    }
    Action::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use std::sync::Arc;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn logged_in() -> (Arc<MockTransport>, App, mpsc::Receiver<DashboardEvent>) {
        let mock = Arc::new(MockTransport::new());
        let (dashboard, rx) = Dashboard::new(mock.clone(), None);
        let mut app = App::new(LogBuffer::new(), "admin");
        app.enter_dashboard("admin".to_string(), dashboard);
        (mock, app, rx)
    }

    #[test]
    fn login_screen_collects_credentials() {
        let mut app = App::new(LogBuffer::new(), "admin");
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Enter)), Action::None);

        for c in "pw".chars() {
            handle_key_event(&mut app, press(KeyCode::Char(c)));
        }
        assert_eq!(app.login_form.password, "pw");
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Enter)), Action::Login);

        // 'q' is text on the login screen, Esc quits
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert_eq!(app.login_form.password, "pwq");
        assert_eq!(handle_key_event(&mut app, press(KeyCode::Esc)), Action::Quit);
    }

    #[tokio::test]
    async fn view_keys_switch_and_filter_mode_captures_text() {
        let (_mock, mut app, _rx) = logged_in();

        handle_key_event(&mut app, press(KeyCode::Char('3')));
        assert_eq!(app.active_view(), ViewKind::Messages);

        handle_key_event(&mut app, press(KeyCode::Char('/')));
        assert!(app.filter_editor.is_some());
        // 'q' and 'L' are filter text while editing
        handle_key_event(&mut app, press(KeyCode::Tab));
        assert_eq!(
            handle_key_event(&mut app, press(KeyCode::Char('q'))),
            Action::None
        );
        handle_key_event(&mut app, press(KeyCode::Enter));
        assert!(app.filter_editor.is_none());

        let dashboard = app.dashboard.as_ref().unwrap();
        assert_eq!(
            dashboard.filter_value(ViewKind::Messages, crate::dashboard::filters::FilterKey::MessageType),
            Some("q")
        );
        assert_eq!(dashboard.active(), ViewKind::Messages);
        assert_eq!(
            handle_key_event(&mut app, press(KeyCode::Char('L'))),
            Action::Logout
        );
    }

    #[tokio::test]
    async fn users_view_rejects_filter_mode() {
        let (_mock, mut app, _rx) = logged_in();
        handle_key_event(&mut app, press(KeyCode::Char('/')));
        assert!(app.filter_editor.is_none());
        assert_eq!(
            app.toast.as_ref().map(|t| t.message.as_str()),
            Some("Users has no filters")
        );
    }

    #[tokio::test]
    async fn help_modal_absorbs_keys() {
        let (_mock, mut app, _rx) = logged_in();
        handle_key_event(&mut app, press(KeyCode::Char('?')));
        assert_eq!(app.modal, Some(Modal::Help));
        assert_eq!(
            handle_key_event(&mut app, press(KeyCode::Char('q'))),
            Action::None
        );
        assert!(app.modal.is_none());
    }
}
