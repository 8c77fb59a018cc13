// App state for the TUI
//
// Holds everything the renderer reads and the key router mutates. Network
// work never happens here: key handling returns an `Action` and the event
// loop performs anything that has to be awaited (login, logout).

use crate::dashboard::filters::FilterKey;
use crate::dashboard::{Dashboard, Update, ViewKind};
use crate::logging::LogBuffer;
use crate::tui::components::Toast;
use crate::tui::modal::Modal;
use crate::tui::theme::Theme;

/// Spinner frames for the loading indicator
const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
}

/// Work the event loop must do after a keypress
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Login,
    Logout,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Login,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    /// A login request is in flight
    pub busy: bool,
}

impl LoginForm {
    pub fn new(login: impl Into<String>) -> Self {
        let login = login.into();
        // Prefilled login: start on the password
        let focus = if login.is_empty() {
            LoginField::Login
        } else {
            LoginField::Password
        };
        Self {
            login,
            focus,
            ..Default::default()
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Login => LoginField::Password,
            LoginField::Password => LoginField::Login,
        };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Login => &mut self.login,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.busy && !self.login.trim().is_empty() && !self.password.is_empty()
    }
}

/// Filter bar in edit mode; `field` indexes the active view's filter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterEditor {
    pub field: usize,
}

pub struct App {
    pub screen: Screen,
    pub login_form: LoginForm,
    /// Logged-in operator
    pub session_login: Option<String>,
    pub dashboard: Option<Dashboard>,
    /// Selected row per view, indexed by `ViewKind::index`
    pub selected: [usize; 3],
    pub filter_editor: Option<FilterEditor>,
    pub modal: Option<Modal>,
    pub toast: Option<Toast>,
    pub show_logs: bool,
    pub log_buffer: LogBuffer,
    pub theme: Theme,
    pub should_quit: bool,
    spinner_frame: usize,
}

impl App {
    pub fn new(log_buffer: LogBuffer, login: &str) -> Self {
        Self {
            screen: Screen::Login,
            login_form: LoginForm::new(login),
            session_login: None,
            dashboard: None,
            selected: [0; 3],
            filter_editor: None,
            modal: None,
            toast: None,
            show_logs: false,
            log_buffer,
            theme: Theme::default(),
            should_quit: false,
            spinner_frame: 0,
        }
    }

    /// Switch to the dashboard screen for a fresh session
    pub fn enter_dashboard(&mut self, login: String, dashboard: Dashboard) {
        self.session_login = Some(login);
        self.dashboard = Some(dashboard);
        self.screen = Screen::Dashboard;
        self.selected = [0; 3];
        self.filter_editor = None;
        self.modal = None;
        self.login_form.password.clear();
        self.login_form.error = None;
        self.login_form.busy = false;
    }

    /// Back to the login screen; the caller has already torn the session down
    pub fn enter_login(&mut self, message: Option<String>) {
        self.session_login = None;
        self.dashboard = None;
        self.screen = Screen::Login;
        self.filter_editor = None;
        self.modal = None;
        self.login_form.password.clear();
        self.login_form.focus = LoginField::Password;
        self.login_form.error = message;
    }

    pub fn active_view(&self) -> ViewKind {
        self.dashboard
            .as_ref()
            .map(Dashboard::active)
            .unwrap_or_default()
    }

    pub fn selected_row(&self) -> usize {
        self.selected[self.active_view().index()]
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    /// Advance animations and drop an expired toast
    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[self.spinner_frame]
    }

    pub fn select_view(&mut self, view: ViewKind) {
        self.filter_editor = None;
        if let Some(dashboard) = self.dashboard.as_mut() {
            dashboard.activate(view);
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let Some(dashboard) = self.dashboard.as_ref() else {
            return;
        };
        let view = dashboard.active();
        let rows = dashboard.row_count(view);
        let slot = &mut self.selected[view.index()];
        *slot = if rows == 0 {
            0
        } else {
            slot.saturating_add_signed(delta).min(rows - 1)
        };
    }

    /// Keep selections inside the rows a fresh page has
    pub fn on_update(&mut self, update: &Update) {
        match update {
            Update::Applied { view, rows } => {
                let slot = &mut self.selected[view.index()];
                *slot = (*slot).min(rows.saturating_sub(1));
            }
            Update::Failed { .. } => {
                if let Some(error) = self.dashboard.as_ref().and_then(Dashboard::last_error) {
                    let message = format!("✗ {}", error);
                    self.show_toast(message);
                }
            }
            _ => {}
        }
    }

    /// Open the filter bar on the active view's first filter
    pub fn begin_filter_edit(&mut self) -> bool {
        if self.active_view().filter_keys().is_empty() {
            return false;
        }
        self.filter_editor = Some(FilterEditor { field: 0 });
        true
    }

    pub fn editing_filter_key(&self) -> Option<FilterKey> {
        let editor = self.filter_editor?;
        self.active_view().filter_keys().get(editor.field).copied()
    }

    pub fn next_filter_field(&mut self) {
        let count = self.active_view().filter_keys().len();
        if let Some(editor) = self.filter_editor.as_mut() {
            if count > 0 {
                editor.field = (editor.field + 1) % count;
            }
        }
    }

    /// Apply an edit to the focused filter; each change reloads the view
    pub fn edit_filter(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(key) = self.editing_filter_key() else {
            return;
        };
        let Some(dashboard) = self.dashboard.as_mut() else {
            return;
        };
        let view = dashboard.active();
        let mut value = dashboard.filter_value(view, key).unwrap_or("").to_string();
        edit(&mut value);
        dashboard.set_filter(view, key, value);
        self.selected[view.index()] = 0;
    }

    /// The selected row of the active view as JSON
    pub fn selected_record_json(&self) -> Option<serde_json::Value> {
        let dashboard = self.dashboard.as_ref()?;
        let row = self.selected_row();
        let value = match dashboard.active() {
            ViewKind::Users => serde_json::to_value(dashboard.users().page().get(row)?),
            ViewKind::Greetings => serde_json::to_value(dashboard.greetings().page().get(row)?),
            ViewKind::Messages => serde_json::to_value(dashboard.messages().page().get(row)?),
        };
        value.ok()
    }

    /// User id of the selected row in the users view
    pub fn selected_user_id(&self) -> Option<i64> {
        let dashboard = self.dashboard.as_ref()?;
        if dashboard.active() != ViewKind::Users {
            return None;
        }
        dashboard
            .users()
            .page()
            .get(self.selected_row())
            .map(|u| u.tg_user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn app_with_dashboard() -> (
        Arc<MockTransport>,
        App,
        tokio::sync::mpsc::Receiver<crate::dashboard::DashboardEvent>,
    ) {
        let mock = Arc::new(MockTransport::new());
        let (dashboard, rx) = Dashboard::new(mock.clone(), None);
        let mut app = App::new(LogBuffer::new(), "admin");
        app.enter_dashboard("admin".to_string(), dashboard);
        (mock, app, rx)
    }

    async fn apply_next(
        app: &mut App,
        rx: &mut tokio::sync::mpsc::Receiver<crate::dashboard::DashboardEvent>,
    ) -> Update {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let update = app.dashboard.as_mut().unwrap().handle(event);
        app.on_update(&update);
        update
    }

    #[test]
    fn login_form_starts_on_password_when_prefilled() {
        let form = LoginForm::new("admin");
        assert_eq!(form.focus, LoginField::Password);
        assert!(!form.can_submit());

        let form = LoginForm::new("");
        assert_eq!(form.focus, LoginField::Login);
    }

    #[tokio::test]
    async fn typing_in_filter_bar_reloads_with_each_keystroke() {
        let (mock, mut app, mut rx) = app_with_dashboard();
        app.select_view(ViewKind::Messages);
        apply_next(&mut app, &mut rx).await;

        assert!(app.begin_filter_edit());
        app.edit_filter(|v| v.push('4'));
        apply_next(&mut app, &mut rx).await;
        app.edit_filter(|v| v.push('2'));
        apply_next(&mut app, &mut rx).await;
        app.edit_filter(|v| {
            v.pop();
        });
        apply_next(&mut app, &mut rx).await;

        assert_eq!(
            mock.targets(),
            vec![
                "/api/messages",
                "/api/messages?tg_user_id=4",
                "/api/messages?tg_user_id=42",
                "/api/messages?tg_user_id=4",
            ]
        );

        app.next_filter_field();
        assert_eq!(app.editing_filter_key(), Some(FilterKey::MessageType));
    }

    #[tokio::test]
    async fn users_view_has_no_filter_bar() {
        let (_mock, mut app, _rx) = app_with_dashboard();
        assert!(!app.begin_filter_edit());
        assert!(app.filter_editor.is_none());
    }

    #[tokio::test]
    async fn selection_is_clamped_to_page() {
        let (mock, mut app, mut rx) = app_with_dashboard();
        let user = |id: i64| {
            json!({
                "tg_user_id": id, "first_name": null, "last_name": null, "username": null,
                "first_seen_at": "2025-01-01T00:00:00", "last_seen_at": "2025-01-01T00:00:00",
                "greetings_count": 0
            })
        };
        mock.reply("/api/users", json!({ "items": [user(1), user(2), user(3)] }));
        app.select_view(ViewKind::Users);
        apply_next(&mut app, &mut rx).await;

        app.move_selection(10);
        assert_eq!(app.selected_row(), 2);
        assert_eq!(app.selected_user_id(), Some(3));
        assert_eq!(app.selected_record_json().unwrap()["tg_user_id"], 3);

        mock.reply("/api/users", json!({ "items": [user(1)] }));
        app.dashboard.as_mut().unwrap().reload(ViewKind::Users);
        apply_next(&mut app, &mut rx).await;
        assert_eq!(app.selected_row(), 0);

        app.move_selection(-5);
        assert_eq!(app.selected_row(), 0);
    }

    #[tokio::test]
    async fn enter_login_drops_session() {
        let (_mock, mut app, _rx) = app_with_dashboard();
        app.login_form.password = "secret".to_string();
        app.enter_login(Some("Logged out".to_string()));
        assert_eq!(app.screen, Screen::Login);
        assert!(app.dashboard.is_none());
        assert!(app.login_form.password.is_empty());
        assert_eq!(app.login_form.login, "admin");
    }
}
