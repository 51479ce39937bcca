//! Requests a shell emits into flux.

mod app;
mod auth;
mod notif;
mod theme;

pub use app::{NavigateReq, PointerDownReq, ShowToastReq};
pub use auth::{RefreshNavReq, SignInReq, SignOutReq, SignUpReq, UpdatePasswordReq};
pub use notif::{MarkAllReadReq, MarkReadReq, OpenItemReq, TogglePanelReq};
pub use theme::{SetThemeReq, ToggleThemeReq};
