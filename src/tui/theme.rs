// Theme for the TUI
//
// One resolved palette; every component reads its colors from here instead
// of hardcoding them.

use crate::live::ConnectionState;
use crate::logging::LogLevel;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

#[derive(Debug, Clone)]
pub struct Theme {
    // ─── UI Element Colors ───────────────────────────────────
    pub title: Color,
    pub status_bar: Color,
    pub border: Color,
    pub highlight: Color,
    pub border_type: BorderType,

    // ─── Panel Identity Colors ───────────────────────────────
    pub panel_table: Color,
    pub panel_filters: Color,
    pub panel_logs: Color,

    // ─── Terminal Colors ─────────────────────────────────────
    pub background: Color,
    pub foreground: Color,

    // ─── Selection Colors ────────────────────────────────────
    pub selection: Color,
    pub selection_fg: Color,

    // ─── Secondary/Muted Text ────────────────────────────────
    pub muted: Color,

    // ─── Severity ────────────────────────────────────────────
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Color::Cyan,
            status_bar: Color::Gray,
            border: Color::DarkGray,
            highlight: Color::Yellow,
            border_type: BorderType::Rounded,
            panel_table: Color::Blue,
            panel_filters: Color::Magenta,
            panel_logs: Color::Green,
            background: Color::Reset,
            foreground: Color::White,
            selection: Color::Blue,
            selection_fg: Color::White,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
        }
    }
}

impl Theme {
    pub fn connection(&self, state: ConnectionState) -> Color {
        match state {
            ConnectionState::Connected => self.success,
            ConnectionState::Connecting => self.warning,
            ConnectionState::Disconnected => self.error,
        }
    }

    pub fn log_level(&self, level: LogLevel) -> Color {
        match level {
            LogLevel::Error => self.error,
            LogLevel::Warn => self.warning,
            LogLevel::Info => self.foreground,
            LogLevel::Debug | LogLevel::Trace => self.muted,
        }
    }
}
