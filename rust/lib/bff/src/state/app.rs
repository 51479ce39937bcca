//! App-level state, stored at `app/route` and `app/toast`.

use inovoid_flux::State;
use serde::{Deserialize, Serialize};

/// Navigation target the shell should load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRoute(pub String);

impl State for AppRoute {
    const PATH: &'static str = "app/route";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Error,
    Warning,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
        }
    }
}

/// The most recent toast. `seq` grows by one per toast so the shell can
/// show repeated identical messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub seq: u64,
    pub message: String,
    pub kind: ToastKind,
}

impl State for Toast {
    const PATH: &'static str = "app/toast";
}
