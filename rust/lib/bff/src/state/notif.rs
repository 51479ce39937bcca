//! Notification view state.

use inovoid_flux::State;
use serde::{Deserialize, Serialize};

pub const EMPTY_MESSAGE: &str = "No notifications yet";

/// Unread badge, stored at `notif/badge`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BadgeState {
    pub count: u64,
    /// Text to show, `None` when the badge is hidden.
    pub label: Option<String>,
}

impl State for BadgeState {
    const PATH: &'static str = "notif/badge";
}

impl BadgeState {
    pub fn from_count(count: u64) -> Self {
        let label = match count {
            0 => None,
            1..=9 => Some(count.to_string()),
            _ => Some("9+".to_string()),
        };
        Self { count, label }
    }

    pub fn is_visible(&self) -> bool {
        self.label.is_some()
    }
}

/// Dropdown visibility, stored at `notif/panel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelState {
    pub open: bool,
}

impl State for PanelState {
    const PATH: &'static str = "notif/panel";
}

/// Rendered panel contents, stored at `notif/list`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotificationList {
    pub items: Vec<NotificationItem>,
    pub loading: bool,
    pub empty_message: Option<String>,
}

impl State for NotificationList {
    const PATH: &'static str = "notif/list";
}

impl NotificationList {
    pub fn loading() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            empty_message: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            empty_message: Some(EMPTY_MESSAGE.to_string()),
        }
    }

    pub fn find(&self, id: &str) -> Option<&NotificationItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn unread(&self) -> usize {
        self.items.iter().filter(|i| !i.read).count()
    }
}

/// One row of the panel, ready to display. `text_html` is already escaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    pub id: String,
    pub kind: String,
    pub read: bool,
    pub actor_name: String,
    pub actor_avatar: String,
    pub text_html: String,
    pub icon: String,
    pub href: String,
    pub time_ago: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badge_labels() {
        assert_eq!(BadgeState::from_count(0).label, None);
        assert!(!BadgeState::from_count(0).is_visible());
        assert_eq!(BadgeState::from_count(1).label.as_deref(), Some("1"));
        assert_eq!(BadgeState::from_count(9).label.as_deref(), Some("9"));
        assert_eq!(BadgeState::from_count(10).label.as_deref(), Some("9+"));
        assert_eq!(BadgeState::from_count(250).label.as_deref(), Some("9+"));
    }

    #[test]
    fn empty_list_carries_message() {
        let list = NotificationList::empty();
        assert!(list.items.is_empty());
        assert!(!list.loading);
        assert_eq!(list.empty_message.as_deref(), Some(EMPTY_MESSAGE));
    }
}
