//! Element ids and attributes a web shell binds state to.

pub const NOTIF_PANEL: &str = "notif-panel";
pub const NOTIF_BUTTON: &str = "notif-btn";
pub const NOTIF_BADGE: &str = "notif-badge";
pub const NOTIF_LIST: &str = "notif-list";

/// `data-auth="logged-in"` / `data-auth="logged-out"` visibility toggles.
pub const DATA_AUTH: &str = "data-auth";
pub const AUTH_LOGGED_IN: &str = "logged-in";
pub const AUTH_LOGGED_OUT: &str = "logged-out";
pub const DATA_AUTH_AVATAR: &str = "data-auth-avatar";
pub const DATA_AUTH_NAME: &str = "data-auth-name";

pub const DATA_THEME_ICON: &str = "data-theme-icon";
pub const DATA_THEME_LABEL: &str = "data-theme-label";

/// Class toggled on hidden elements (badge at zero, closed panel).
pub const HIDDEN_CLASS: &str = "hidden";
