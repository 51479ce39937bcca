//! Notification badge, panel and realtime reconciliation.
//!
//! The badge always shows the server's unread count: every change that can
//! move it (a realtime insert, marking one or all read) is followed by a
//! fresh count rather than a local adjustment. The panel list is fetched
//! when the panel opens, and re-fetched on inserts only while it is open.
//!
//! Failures never reach the caller. A failed count leaves the badge as it
//! was; a failed list fetch shows the empty state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::Utc;
use inovoid_client::Notification;
use inovoid_flux::{Flux, StateStore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::{NotificationBackend, NotificationSource};
use crate::handlers::toast::{navigate, show_toast};
use crate::location::Location;
use crate::render::render_item;
use crate::request::{MarkAllReadReq, MarkReadReq, OpenItemReq, PointerDownReq, TogglePanelReq};
use crate::state::{BadgeState, NotificationList, PanelState, ToastKind};

pub const NEW_NOTIFICATION_TOAST: &str = "New notification received";

pub struct Notifications {
    backend: Arc<dyn NotificationBackend>,
    source: Arc<dyn NotificationSource>,
    store: Arc<StateStore>,
    location: Location,
    user_id: Mutex<Option<String>>,
    consumer: Mutex<Option<JoinHandle<()>>>,
    /// Bumped by every `initialize` and `teardown`. A subscription is only
    /// installed by the call that still owns the current generation.
    generation: AtomicU64,
}

impl Notifications {
    pub fn new(
        backend: Arc<dyn NotificationBackend>,
        source: Arc<dyn NotificationSource>,
        store: Arc<StateStore>,
        location: Location,
    ) -> Arc<Self> {
        Arc::new(Self {
            backend,
            source,
            store,
            location,
            user_id: Mutex::new(None),
            consumer: Mutex::new(None),
            generation: AtomicU64::new(0),
        })
    }

    fn user(&self) -> Option<String> {
        self.user_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.user().is_some()
    }

    fn is_current(&self, user_id: &str) -> bool {
        self.user().as_deref() == Some(user_id)
    }

    fn panel_open(&self) -> bool {
        self.store.get::<PanelState>().map(|p| p.open).unwrap_or(false)
    }

    /// Start tracking `user_id`: load the badge, then follow inserts.
    ///
    /// Calling it again replaces the previous subscription. When calls
    /// overlap, or `teardown` lands while one is pending, only the latest
    /// call installs its subscription. Outside-click closing of the panel
    /// is active from here on.
    pub async fn initialize(self: &Arc<Self>, user_id: &str) {
        let generation = {
            let mut consumer = self.consumer.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(task) = consumer.take() {
                task.abort();
            }
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };
        *self.user_id.lock().unwrap_or_else(PoisonError::into_inner) = Some(user_id.to_string());
        if self.store.get::<PanelState>().is_none() {
            self.store.set(PanelState { open: false });
        }

        self.refresh_badge().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }

        let mut subscription = match self.source.subscribe(user_id).await {
            Ok(subscription) => subscription,
            Err(e) => {
                warn!(user_id, error = %e, "realtime unavailable, badge will not update live");
                return;
            }
        };

        let mut consumer = self.consumer.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(user_id, "superseded before subscribing, dropping subscription");
            return;
        }
        let weak: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            while let Some(row) = subscription.next().await {
                let Some(this) = weak.upgrade() else { break };
                this.on_realtime_insert(&row).await;
            }
            debug!("notification subscription ended");
        });
        if let Some(old) = consumer.replace(task) {
            old.abort();
        }
        info!(user_id, "notifications live");
    }

    /// A notification row was inserted for the current user.
    pub async fn on_realtime_insert(&self, row: &Notification) {
        debug!(id = %row.id, "notification inserted");
        show_toast(&self.store, NEW_NOTIFICATION_TOAST, ToastKind::Info);
        self.refresh_badge().await;
        if self.panel_open() {
            self.render_list().await;
        }
    }

    /// Re-count unread rows. On failure the badge keeps its last value.
    pub async fn refresh_badge(&self) {
        let Some(user_id) = self.user() else { return };
        match self.backend.unread_count(&user_id).await {
            Ok(count) if self.is_current(&user_id) => self.store.set(BadgeState::from_count(count)),
            Ok(_) => debug!("user changed during count, dropping result"),
            Err(e) => warn!(error = %e, "unread count failed"),
        }
    }

    /// Fetch and render the most recent notifications into `notif/list`.
    pub async fn render_list(&self) {
        let Some(user_id) = self.user() else { return };
        self.store.set(NotificationList::loading());

        let rows = match self.backend.recent(&user_id).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "notification fetch failed");
                Vec::new()
            }
        };
        if !self.is_current(&user_id) {
            return;
        }
        if rows.is_empty() {
            self.store.set(NotificationList::empty());
            return;
        }

        let now = Utc::now();
        let items = rows
            .iter()
            .map(|n| render_item(n, &self.location, now))
            .collect();
        self.store.set(NotificationList {
            items,
            loading: false,
            empty_message: None,
        });
    }

    pub async fn toggle_panel(&self) {
        let open = !self.panel_open();
        self.store.set(PanelState { open });
        if open {
            self.render_list().await;
        }
    }

    /// Close the panel when a press lands outside both it and its button.
    pub fn on_pointer_down(&self, in_panel: bool, in_toggle: bool) {
        if !self.is_initialized() || !self.panel_open() || in_panel || in_toggle {
            return;
        }
        self.store.set(PanelState { open: false });
    }

    /// Mark one rendered item read. Items already read, or not on screen,
    /// are left alone.
    pub async fn mark_read(&self, id: &str) {
        let Some(list) = self.store.get::<NotificationList>() else { return };
        match list.find(id) {
            Some(item) if !item.read => {}
            Some(_) => return,
            None => {
                debug!(id, "mark read: item not rendered");
                return;
            }
        }

        if let Err(e) = self.backend.mark_read(id).await {
            warn!(id, error = %e, "mark read failed");
            return;
        }
        self.set_item_read(id);
        self.refresh_badge().await;
    }

    fn set_item_read(&self, id: &str) {
        let Some(list) = self.store.get::<NotificationList>() else { return };
        let mut list = (*list).clone();
        if let Some(item) = list.items.iter_mut().find(|i| i.id == id) {
            item.read = true;
        }
        self.store.set(list);
    }

    /// Click on an item: mark it read if needed, then follow its link.
    pub async fn open_item(&self, id: &str) {
        let Some(href) = self
            .store
            .get::<NotificationList>()
            .and_then(|l| l.find(id).map(|i| i.href.clone()))
        else {
            return;
        };
        self.mark_read(id).await;
        navigate(&self.store, href);
    }

    pub async fn mark_all_read(&self) {
        let Some(user_id) = self.user() else { return };
        if let Err(e) = self.backend.mark_all_read(&user_id).await {
            warn!(error = %e, "mark all read failed");
        }
        self.refresh_badge().await;
        self.render_list().await;
    }

    fn stop_consumer(&self) {
        if let Some(task) = self.consumer.lock().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
        }
    }

    /// Stop following inserts, forget the user and clear the badge, panel
    /// and list. A pending `initialize` will not subscribe.
    pub fn teardown(&self) {
        {
            let mut consumer = self.consumer.lock().unwrap_or_else(PoisonError::into_inner);
            self.generation.fetch_add(1, Ordering::SeqCst);
            if let Some(task) = consumer.take() {
                task.abort();
            }
        }
        *self.user_id.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.set(BadgeState::default());
        self.store.set(PanelState { open: false });
        self.store.set(NotificationList::default());
        debug!("notifications torn down");
    }

    pub fn register(self: &Arc<Self>, flux: &Flux) {
        {
            let this = Arc::clone(self);
            flux.on::<TogglePanelReq, _, _>(move |_, _| {
                let this = Arc::clone(&this);
                async move { this.toggle_panel().await }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<MarkReadReq, _, _>(move |req, _| {
                let this = Arc::clone(&this);
                async move { this.mark_read(&req.id).await }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<OpenItemReq, _, _>(move |req, _| {
                let this = Arc::clone(&this);
                async move { this.open_item(&req.id).await }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<MarkAllReadReq, _, _>(move |_, _| {
                let this = Arc::clone(&this);
                async move { this.mark_all_read().await }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<PointerDownReq, _, _>(move |req, _| {
                let this = Arc::clone(&this);
                async move { this.on_pointer_down(req.in_panel, req.in_toggle) }
            });
        }
    }
}

impl Drop for Notifications {
    fn drop(&mut self) {
        self.stop_consumer();
    }
}
