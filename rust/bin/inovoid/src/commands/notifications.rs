//! Notification listing, read-state changes and live watch.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use inovoid_bff::render::{actor_name, time_ago};
use inovoid_bff::request::TogglePanelReq;
use inovoid_bff::state::{BadgeState, NotificationList, Toast};
use inovoid_bff::{register_handlers, Backends, MemoryPrefs, RealtimeNotifications};
use inovoid_client::{Notification, NotificationKind};
use inovoid_flux::Flux;
use inovoid_realtime::RealtimeClient;
use tracing::info;

use super::Runtime;

fn describe(n: &Notification) -> String {
    let actor = actor_name(n.actor.as_ref());
    let title = n
        .post
        .as_ref()
        .and_then(|p| p.title.as_deref())
        .unwrap_or("Untitled");
    match n.kind {
        NotificationKind::Like => format!("{} liked your post \"{}\"", actor, title),
        NotificationKind::Comment => format!("{} commented on \"{}\"", actor, title),
        NotificationKind::Other => format!("{} did something", actor),
    }
}

pub async fn list(rt: &Runtime, json: bool) -> Result<()> {
    let user = rt.require_user().await?;
    let rows = rt.gateway.fetch_notifications(&user.id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No notifications yet");
        return Ok(());
    }
    let now = Utc::now();
    println!("{:<38} {:<2} {:<10} {}", "ID", "", "WHEN", "WHAT");
    for n in &rows {
        let marker = if n.read { " " } else { "*" };
        println!("{:<38} {:<2} {:<10} {}", n.id, marker, time_ago(now, n.created_at), describe(n));
    }
    let unread = rt.gateway.unread_notification_count(&user.id).await?;
    println!("\n{} unread", unread);
    Ok(())
}

pub async fn read(rt: &Runtime, id: &str) -> Result<()> {
    rt.require_user().await?;
    rt.gateway.mark_notification_read(id).await?;
    println!("Marked {} as read.", id);
    Ok(())
}

pub async fn read_all(rt: &Runtime) -> Result<()> {
    let user = rt.require_user().await?;
    rt.gateway.mark_all_notifications_read(&user.id).await?;
    println!("All notifications marked as read.");
    Ok(())
}

/// Run the live notification flow and log what a page would show, until Ctrl-C.
pub async fn watch(rt: &Runtime) -> Result<()> {
    let flux = Flux::new();
    let realtime = RealtimeNotifications::new(
        RealtimeClient::new(rt.project.realtime_url(), rt.project.anon_key.clone()),
        rt.session.clone(),
    );
    let components = register_handlers(
        &flux,
        Backends {
            notifications: rt.gateway.clone(),
            realtime: Arc::new(realtime),
            auth: rt.session.clone(),
            profiles: rt.gateway.clone(),
            prefs: Arc::new(MemoryPrefs::default()),
        },
        rt.location(),
    );

    flux.watch::<BadgeState, _>(|b| {
        info!(count = b.count, label = b.label.as_deref().unwrap_or("(hidden)"), "badge");
    });
    flux.watch::<Toast, _>(|t| info!(kind = t.kind.as_str(), "{}", t.message));
    flux.watch::<NotificationList, _>(|l| {
        if l.loading {
            return;
        }
        info!(items = l.items.len(), unread = l.unread(), "list");
        for item in &l.items {
            info!(id = %item.id, read = item.read, when = %item.time_ago, href = %item.href, "  {}", item.actor_name);
        }
    });

    if components.session.require_auth().await.is_none() {
        anyhow::bail!("Not logged in. Run `inovoid login --email <email>`.");
    }
    components.session.update_nav_auth().await;
    flux.emit(TogglePanelReq).await;

    println!("Watching notifications. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;

    components.notifications.teardown();
    info!("stopped");
    Ok(())
}
