//! Toasts and navigation.

use std::sync::Arc;

use inovoid_flux::{Flux, StateStore};
use tracing::debug;

use crate::request::{NavigateReq, ShowToastReq};
use crate::state::{AppRoute, Toast, ToastKind};

/// Publish a toast at `app/toast`, bumping its sequence number.
pub fn show_toast(store: &StateStore, message: impl Into<String>, kind: ToastKind) {
    let seq = store.get::<Toast>().map(|t| t.seq + 1).unwrap_or(1);
    let message = message.into();
    debug!(seq, kind = kind.as_str(), %message, "toast");
    store.set(Toast { seq, message, kind });
}

pub fn navigate(store: &StateStore, target: impl Into<String>) {
    let target = target.into();
    debug!(%target, "navigate");
    store.set(AppRoute(target));
}

pub fn register(flux: &Flux) {
    flux.on::<ShowToastReq, _, _>(|req, store: Arc<StateStore>| async move {
        show_toast(&store, req.message.clone(), req.kind);
    });
    flux.on::<NavigateReq, _, _>(|req, store: Arc<StateStore>| async move {
        navigate(&store, req.0.clone());
    });
}
