//! The three collection views

use super::filters::FilterKey;
use crate::live::NotificationKind;

/// One of the dashboard's collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewKind {
    #[default]
    Users,
    Greetings,
    Messages,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Users, ViewKind::Greetings, ViewKind::Messages];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Greetings => "Greetings",
            Self::Messages => "Messages",
        }
    }

    /// List endpoint backing this view
    pub fn path(&self) -> &'static str {
        match self {
            Self::Users => "/api/users",
            Self::Greetings => "/api/greetings",
            Self::Messages => "/api/messages",
        }
    }

    /// Filters the view's endpoint accepts, in query order
    pub fn filter_keys(&self) -> &'static [FilterKey] {
        match self {
            Self::Users => &[],
            Self::Greetings => &[FilterKey::UserId],
            Self::Messages => &[FilterKey::UserId, FilterKey::MessageType],
        }
    }

    /// The view a notification kind refreshes
    pub fn for_notification(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::UserUpserted => Self::Users,
            NotificationKind::GreetingSent => Self::Greetings,
            NotificationKind::MessageReceived => Self::Messages,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Users => 0,
            Self::Greetings => 1,
            Self::Messages => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps_both_ways() {
        assert_eq!(ViewKind::Messages.next(), ViewKind::Users);
        assert_eq!(ViewKind::Users.prev(), ViewKind::Messages);
        for view in ViewKind::ALL {
            assert_eq!(view.next().prev(), view);
        }
    }

    #[test]
    fn test_each_notification_kind_maps_to_distinct_view() {
        let views: Vec<ViewKind> = NotificationKind::ALL
            .into_iter()
            .map(ViewKind::for_notification)
            .collect();
        assert_eq!(views, ViewKind::ALL.to_vec());
    }
}
