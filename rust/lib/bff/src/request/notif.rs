//! Notification panel requests.

use inovoid_flux::Request;

#[derive(Debug, Clone)]
pub struct TogglePanelReq;

impl Request for TogglePanelReq {
    const PATH: &'static str = "notif/toggle";
}

#[derive(Debug, Clone)]
pub struct MarkReadReq {
    pub id: String,
}

impl Request for MarkReadReq {
    const PATH: &'static str = "notif/mark-read";
}

/// Click on a panel item: mark it read, then navigate to it.
#[derive(Debug, Clone)]
pub struct OpenItemReq {
    pub id: String,
}

impl Request for OpenItemReq {
    const PATH: &'static str = "notif/open";
}

#[derive(Debug, Clone)]
pub struct MarkAllReadReq;

impl Request for MarkAllReadReq {
    const PATH: &'static str = "notif/mark-all-read";
}
