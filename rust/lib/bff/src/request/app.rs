//! App-wide UI requests.

use inovoid_flux::Request;

use crate::state::ToastKind;

/// A pointer press anywhere on the page.
///
/// The shell reports whether it landed inside the notification panel or
/// on the button that toggles it.
#[derive(Debug, Clone, Copy)]
pub struct PointerDownReq {
    pub in_panel: bool,
    pub in_toggle: bool,
}

impl Request for PointerDownReq {
    const PATH: &'static str = "ui/pointer-down";
}

#[derive(Debug, Clone)]
pub struct ShowToastReq {
    pub message: String,
    pub kind: ToastKind,
}

impl Request for ShowToastReq {
    const PATH: &'static str = "app/show-toast";
}

#[derive(Debug, Clone)]
pub struct NavigateReq(pub String);

impl Request for NavigateReq {
    const PATH: &'static str = "app/navigate";
}
