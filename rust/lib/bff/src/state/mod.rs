//! View state, one type per store path.

mod app;
mod auth;
mod notif;
mod theme;

pub use app::{AppRoute, Toast, ToastKind};
pub use auth::{AuthPhase, AuthState, AuthUser, NavAuth};
pub use notif::{BadgeState, NotificationItem, NotificationList, PanelState, EMPTY_MESSAGE};
pub use theme::{Theme, ThemeState};
