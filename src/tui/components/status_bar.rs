// Status bar component
//
// Loading indicator, page position and last error on the left; key hints on
// the right (shortened on narrow terminals).

use crate::tui::app::App;
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::Style,
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
    let bp = Breakpoint::from_width(area.width);

    let mut left = Vec::new();
    if dashboard.is_loading(view) {
        left.push(Span::styled(
            format!(" {} loading", app.spinner_char()),
            Style::default().fg(theme.warning),
        ));
    } else {
        left.push(Span::raw(" "));
    }

    let rows = dashboard.row_count(view);
    let offset = dashboard.offset(view) as usize;
    let position = if rows == 0 {
        "no rows".to_string()
    } else {
        format!("rows {}-{}", offset + 1, offset + rows)
    };
    left.push(Span::styled(
        format!(" {} ", position),
        Style::default().fg(theme.status_bar),
    ));

    if let Some(error) = dashboard.last_error() {
        left.push(Span::styled(
            format!("│ ✗ {} ", error),
            Style::default().fg(theme.error),
        ));
    }

    let hints = if app.filter_editor.is_some() {
        "type to filter │ Tab next field │ Enter/Esc done "
    } else if bp.at_least(Breakpoint::Wide) {
        "1-3 view │ / filter │ x clear │ ↑↓ select │ [ ] page │ Enter detail │ y copy │ r refresh │ l logs │ L logout │ q quit "
    } else if bp.at_least(Breakpoint::Normal) {
        "/ filter │ [ ] page │ r refresh │ L logout │ ? help "
    } else {
        "? help "
    };

    let block = Block::default().borders(Borders::TOP);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(Line::from(left)), inner);

    let hints = Line::from(Span::styled(hints, Style::default().fg(theme.muted))).right_aligned();
    f.render_widget(Paragraph::new(hints), inner);
}
