// Components module - UI building blocks
//
// Shell components are rendered on the dashboard screen:
// - Title bar: view tabs, totals, live channel state
// - Filter bar: filters of the active view
// - Table: the active view's page
// - Status bar: loading, page position, last error, key hints
// - Logs panel: system log entries (toggle)
//
// Overlays (help, user detail) and the toast draw on top.

pub mod filter_bar;
pub mod formatters;
pub mod logs_panel;
pub mod overlays;
pub mod status_bar;
pub mod table;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;
