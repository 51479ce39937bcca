//! Inovoid view layer.
//!
//! Rust owns the view state; a shell (web page, desktop window, terminal)
//! renders what it reads from the flux store and feeds input back as
//! typed requests.
//!
//! # State paths
//!
//! | Path | Type |
//! |---|---|
//! | `notif/badge` | [`BadgeState`](state::BadgeState) |
//! | `notif/panel` | [`PanelState`](state::PanelState) |
//! | `notif/list` | [`NotificationList`](state::NotificationList) |
//! | `app/toast` | [`Toast`](state::Toast) |
//! | `app/route` | [`AppRoute`](state::AppRoute) |
//! | `auth/state` | [`AuthState`](state::AuthState) |
//! | `auth/nav` | [`NavAuth`](state::NavAuth) |
//! | `theme/state` | [`ThemeState`](state::ThemeState) |

pub mod backend;
pub mod dom;
pub mod handlers;
pub mod location;
pub mod prefs;
pub mod render;
pub mod request;
pub mod state;

pub use backend::{AuthBackend, NotificationBackend, NotificationSource, ProfileBackend, RealtimeNotifications};
pub use handlers::notifications::Notifications;
pub use handlers::session::SessionGuard;
pub use handlers::theme::ThemeController;
pub use handlers::toast::show_toast;
pub use handlers::{register_handlers, Backends, Components};
pub use location::Location;
pub use prefs::{FilePrefs, MemoryPrefs, PreferenceStore, PrefsError};
