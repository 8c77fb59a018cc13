// Modal overlays
//
// Modals handle their own input and return actions; App just holds
// Option<Modal> and the key router acts on the returned ModalAction.

use crossterm::event::KeyCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    Close,
    ScrollUp,
    ScrollDown,
    /// Copy the modal's record as JSON
    Copy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Keyboard shortcuts
    Help,
    /// One user with their recent greetings and messages
    UserDetail { tg_user_id: i64, scroll: u16 },
}

impl Modal {
    pub fn user_detail(tg_user_id: i64) -> Self {
        Modal::UserDetail {
            tg_user_id,
            scroll: 0,
        }
    }

    pub fn handle_input(&mut self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => ModalAction::Close,
                _ => ModalAction::None,
            },
            Modal::UserDetail { scroll, .. } => match key {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => ModalAction::Close,
                KeyCode::Up | KeyCode::Char('k') => {
                    *scroll = scroll.saturating_sub(1);
                    ModalAction::ScrollUp
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    *scroll = scroll.saturating_add(1);
                    ModalAction::ScrollDown
                }
                KeyCode::Char('y') => ModalAction::Copy,
                _ => ModalAction::None,
            },
        }
    }
}
