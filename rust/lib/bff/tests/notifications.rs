//! Badge, panel and realtime reconciliation against in-memory backends.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{eventually, notif, FakeNotifications, FakeRealtime};
use inovoid_bff::handlers::notifications::NEW_NOTIFICATION_TOAST;
use inovoid_bff::request::{MarkAllReadReq, OpenItemReq, PointerDownReq, TogglePanelReq};
use inovoid_bff::state::{AppRoute, BadgeState, NotificationList, PanelState, Toast, ToastKind, EMPTY_MESSAGE};
use inovoid_bff::{Location, NotificationBackend, Notifications};
use inovoid_client::Notification;
use inovoid_flux::Flux;

struct Page {
    flux: Flux,
    notifications: Arc<Notifications>,
    backend: Arc<FakeNotifications>,
    realtime: Arc<FakeRealtime>,
}

/// Handlers registered, no user yet.
fn idle_page(rows: Vec<Notification>) -> Page {
    let flux = Flux::new();
    let backend = FakeNotifications::with_rows(rows);
    let realtime = FakeRealtime::new();
    let notifications = Notifications::new(
        backend.clone(),
        realtime.clone(),
        Arc::clone(flux.store()),
        Location::new("/pages/feed.html"),
    );
    notifications.register(&flux);
    Page {
        flux,
        notifications,
        backend,
        realtime,
    }
}

async fn page(rows: Vec<Notification>) -> Page {
    let p = idle_page(rows);
    p.notifications.initialize("u1").await;
    p
}

fn badge(flux: &Flux) -> BadgeState {
    flux.get::<BadgeState>().map(|b| (*b).clone()).unwrap_or_default()
}

fn list(flux: &Flux) -> NotificationList {
    flux.get::<NotificationList>().map(|l| (*l).clone()).unwrap_or_default()
}

fn panel_open(flux: &Flux) -> bool {
    flux.get::<PanelState>().map(|p| p.open).unwrap_or(false)
}

#[tokio::test]
async fn badge_hidden_when_nothing_unread() {
    let p = page(vec![notif("a", 0, true)]).await;
    let b = badge(&p.flux);
    assert_eq!(b.count, 0);
    assert_eq!(b.label, None);
}

#[tokio::test]
async fn badge_caps_at_nine_plus() {
    let rows = (0..12).map(|i| notif(&format!("n{}", i), i, false)).collect();
    let p = page(rows).await;
    let b = badge(&p.flux);
    assert_eq!(b.count, 12);
    assert_eq!(b.label.as_deref(), Some("9+"));
}

#[tokio::test]
async fn opening_fetches_once_and_closing_never() {
    let p = page(vec![notif("a", 0, false)]).await;
    assert_eq!(p.backend.calls_to("list"), 0);

    p.flux.emit(TogglePanelReq).await;
    assert!(panel_open(&p.flux));
    assert_eq!(p.backend.calls_to("list"), 1);

    p.flux.emit(TogglePanelReq).await;
    assert!(!panel_open(&p.flux));
    assert_eq!(p.backend.calls_to("list"), 1);
}

#[tokio::test]
async fn mark_read_is_idempotent() {
    let p = page(vec![notif("a", 0, false), notif("b", 1, false)]).await;
    p.flux.emit(TogglePanelReq).await;

    p.notifications.mark_read("a").await;
    p.notifications.mark_read("a").await;

    assert_eq!(p.backend.calls_to("mark_read"), 1);
    assert_eq!(badge(&p.flux).count, 1);
    assert!(list(&p.flux).find("a").unwrap().read);
}

#[tokio::test]
async fn mark_read_ignores_items_not_rendered() {
    let p = page(vec![notif("a", 0, false)]).await;
    p.notifications.mark_read("a").await;
    assert_eq!(p.backend.calls_to("mark_read"), 0);
}

#[tokio::test]
async fn badge_is_recounted_not_decremented() {
    let p = page(vec![notif("a", 0, false), notif("b", 1, false)]).await;
    p.flux.emit(TogglePanelReq).await;

    // Another device reads "b" meanwhile; the recount picks that up.
    p.backend.mark_read("b").await.unwrap();
    p.backend.clear_calls();

    p.notifications.mark_read("a").await;
    assert_eq!(p.backend.calls(), vec!["mark_read", "count"]);
    assert_eq!(badge(&p.flux).count, 0);
}

#[tokio::test]
async fn mark_all_read_clears_badge_and_list() {
    let p = page(vec![notif("a", 0, false), notif("b", 1, false), notif("c", 2, true)]).await;
    p.flux.emit(TogglePanelReq).await;

    p.flux.emit(MarkAllReadReq).await;

    let b = badge(&p.flux);
    assert_eq!(b.count, 0);
    assert!(!b.is_visible());
    let l = list(&p.flux);
    assert_eq!(l.items.len(), 3);
    assert_eq!(l.unread(), 0);
}

#[tokio::test]
async fn insert_while_open_recounts_then_rerenders() {
    let p = page(vec![notif("a", 0, true)]).await;
    p.flux.emit(TogglePanelReq).await;
    p.backend.clear_calls();

    let row = notif("b", 5, false);
    p.backend.insert(row.clone());
    assert!(p.realtime.push(row).await);

    eventually(|| list(&p.flux).items.len() == 2).await;
    assert_eq!(p.backend.calls(), vec!["count", "list"]);
    assert_eq!(badge(&p.flux).count, 1);
    assert_eq!(list(&p.flux).items[0].id, "b");

    let toast = p.flux.get::<Toast>().unwrap();
    assert_eq!(toast.message, NEW_NOTIFICATION_TOAST);
    assert_eq!(toast.kind, ToastKind::Info);
}

#[tokio::test]
async fn insert_while_closed_only_recounts() {
    let p = page(vec![]).await;
    p.backend.clear_calls();

    let row = notif("b", 5, false);
    p.backend.insert(row.clone());
    assert!(p.realtime.push(row).await);

    eventually(|| badge(&p.flux).count == 1).await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert_eq!(p.backend.calls(), vec!["count"]);
    assert!(p.flux.get::<NotificationList>().is_none());
}

#[tokio::test]
async fn three_unread_five_read_scenario() {
    let mut rows = Vec::new();
    for i in 0..5 {
        rows.push(notif(&format!("read{}", i), i, true));
    }
    rows.push(notif("unread-old", 10, false));
    rows.push(notif("unread-mid", 20, false));
    rows.push(notif("unread-new", 30, false));
    let p = page(rows).await;

    assert_eq!(badge(&p.flux).label.as_deref(), Some("3"));

    p.flux.emit(TogglePanelReq).await;
    let l = list(&p.flux);
    assert_eq!(l.items.len(), 8);
    assert_eq!(l.unread(), 3);
    let ids: Vec<&str> = l.items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(&ids[..3], &["unread-new", "unread-mid", "unread-old"]);

    let newest_unread = l.items.iter().find(|i| !i.read).unwrap().id.clone();
    p.flux.emit(OpenItemReq { id: newest_unread }).await;

    assert_eq!(p.flux.get::<AppRoute>().unwrap().0, "post.html?id=post-unread-new");
    assert_eq!(badge(&p.flux).label.as_deref(), Some("2"));
}

#[tokio::test]
async fn opening_a_read_item_only_navigates() {
    let p = page(vec![notif("a", 0, true)]).await;
    p.flux.emit(TogglePanelReq).await;

    p.flux.emit(OpenItemReq { id: "a".into() }).await;

    assert_eq!(p.backend.calls_to("mark_read"), 0);
    assert_eq!(p.flux.get::<AppRoute>().unwrap().0, "post.html?id=post-a");
}

#[tokio::test]
async fn failed_list_shows_empty_state() {
    let p = page(vec![notif("a", 0, false)]).await;
    p.backend.fail_list.store(true, Ordering::SeqCst);

    p.flux.emit(TogglePanelReq).await;

    let l = list(&p.flux);
    assert!(l.items.is_empty());
    assert!(!l.loading);
    assert_eq!(l.empty_message.as_deref(), Some(EMPTY_MESSAGE));
}

#[tokio::test]
async fn failed_count_keeps_badge() {
    let p = page(vec![notif("a", 0, false)]).await;
    assert_eq!(badge(&p.flux).count, 1);

    p.backend.fail_count.store(true, Ordering::SeqCst);
    p.backend.insert(notif("b", 1, false));
    p.notifications.refresh_badge().await;

    assert_eq!(badge(&p.flux).count, 1);
}

#[tokio::test]
async fn outside_press_closes_panel() {
    let p = page(vec![]).await;
    p.flux.emit(TogglePanelReq).await;

    p.flux.emit(PointerDownReq { in_panel: true, in_toggle: false }).await;
    assert!(panel_open(&p.flux));
    p.flux.emit(PointerDownReq { in_panel: false, in_toggle: true }).await;
    assert!(panel_open(&p.flux));

    p.flux.emit(PointerDownReq { in_panel: false, in_toggle: false }).await;
    assert!(!panel_open(&p.flux));
}

#[tokio::test]
async fn teardown_stops_delivery() {
    let p = page(vec![]).await;
    p.notifications.teardown();

    eventually(|| p.realtime.is_closed(0)).await;
    assert!(!p.realtime.push(notif("late", 1, false)).await);
    assert!(!p.notifications.is_initialized());
}

#[tokio::test]
async fn reinitialize_replaces_subscription() {
    let p = page(vec![]).await;
    p.notifications.initialize("u1").await;

    assert_eq!(p.realtime.subscribes.load(Ordering::SeqCst), 2);
    eventually(|| p.realtime.is_closed(0)).await;
    assert!(!p.realtime.is_closed(1));
}

#[tokio::test]
async fn overlapping_initialize_keeps_one_subscription() {
    let p = idle_page(vec![]);
    p.realtime.delay_next(&[30, 5]);

    let (a, b) = (Arc::clone(&p.notifications), Arc::clone(&p.notifications));
    tokio::join!(a.initialize("u1"), b.initialize("u1"));

    eventually(|| p.realtime.live() == 1).await;

    p.backend.clear_calls();
    let row = notif("n1", 1, false);
    p.backend.insert(row.clone());
    assert!(p.realtime.push(row).await);

    eventually(|| badge(&p.flux).count == 1).await;
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;
    assert_eq!(p.backend.calls_to("count"), 1);
    assert_eq!(p.realtime.live(), 1);
}

#[tokio::test]
async fn teardown_during_initialize_installs_nothing() {
    let p = idle_page(vec![notif("a", 0, false)]);
    p.realtime.delay_next(&[30]);

    let pending = {
        let n = Arc::clone(&p.notifications);
        tokio::spawn(async move { n.initialize("u1").await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    p.notifications.teardown();
    pending.await.unwrap();

    eventually(|| p.realtime.live() == 0).await;
    assert!(!p.notifications.is_initialized());
    assert!(!p.realtime.push(notif("late", 1, false)).await);
    assert!(p.flux.get::<Toast>().is_none());
    assert_eq!(badge(&p.flux), BadgeState::default());
}

#[tokio::test]
async fn teardown_clears_badge_panel_and_list() {
    let p = page(vec![notif("a", 0, false), notif("b", 1, false)]).await;
    p.flux.emit(TogglePanelReq).await;
    assert_eq!(badge(&p.flux).count, 2);
    assert_eq!(list(&p.flux).items.len(), 2);

    p.notifications.teardown();

    assert_eq!(badge(&p.flux), BadgeState::default());
    assert!(!badge(&p.flux).is_visible());
    assert!(!panel_open(&p.flux));
    assert_eq!(list(&p.flux), NotificationList::default());
}

#[tokio::test]
async fn realtime_outage_still_shows_badge() {
    let flux = Flux::new();
    let backend = FakeNotifications::with_rows(vec![notif("a", 0, false)]);
    let realtime = FakeRealtime::new();
    realtime.refuse.store(true, Ordering::SeqCst);
    let notifications = Notifications::new(
        backend.clone(),
        realtime.clone(),
        Arc::clone(flux.store()),
        Location::new("/index.html"),
    );

    notifications.initialize("u1").await;

    assert_eq!(badge(&flux).count, 1);
    assert!(notifications.is_initialized());
}

#[tokio::test]
async fn links_from_root_page_go_through_pages() {
    let flux = Flux::new();
    let backend = FakeNotifications::with_rows(vec![notif("a", 0, false)]);
    let notifications = Notifications::new(
        backend,
        FakeRealtime::new(),
        Arc::clone(flux.store()),
        Location::new("/index.html"),
    );
    notifications.register(&flux);
    notifications.initialize("u1").await;

    flux.emit(TogglePanelReq).await;
    assert_eq!(list(&flux).items[0].href, "pages/post.html?id=post-a");
}
