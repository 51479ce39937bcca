//! Text and HTML rendering for notification items.

use chrono::{DateTime, Utc};
use inovoid_client::{Notification, NotificationKind, ProfileSummary};

use crate::location::Location;
use crate::state::NotificationItem;

const FALLBACK_ACTOR: &str = "Someone";
const FALLBACK_TITLE: &str = "Untitled";

/// Escape text for interpolation into HTML.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Coarse relative time: `just now`, `5m ago`, `3h ago`, `12d ago`, then
/// an absolute date such as `Mar 1, 2025`.
pub fn time_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{}d ago", days);
    }
    then.format("%b %-d, %Y").to_string()
}

pub fn actor_name(actor: Option<&ProfileSummary>) -> String {
    actor
        .and_then(|a| {
            a.full_name
                .as_deref()
                .filter(|s| !s.is_empty())
                .or(a.nickname.as_deref().filter(|s| !s.is_empty()))
        })
        .unwrap_or(FALLBACK_ACTOR)
        .to_string()
}

/// Generated initials avatar for users without a picture.
pub fn avatar_fallback(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=random",
        urlencoding::encode(name)
    )
}

fn icon(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Like => "favorite",
        NotificationKind::Comment => "chat_bubble",
        NotificationKind::Other => "notifications",
    }
}

fn kind_name(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::Like => "like",
        NotificationKind::Comment => "comment",
        NotificationKind::Other => "other",
    }
}

/// Link to the post a notification is about, or `#`.
pub fn item_href(location: &Location, n: &Notification) -> String {
    match (n.kind, n.post_id.as_deref()) {
        (NotificationKind::Like | NotificationKind::Comment, Some(post_id)) => {
            format!("{}post.html?id={}", location.pages_path(), post_id)
        }
        _ => "#".to_string(),
    }
}

pub fn item_text(n: &Notification) -> String {
    let actor = escape_html(&actor_name(n.actor.as_ref()));
    let title = n
        .post
        .as_ref()
        .and_then(|p| p.title.as_deref())
        .filter(|t| !t.is_empty())
        .unwrap_or(FALLBACK_TITLE);
    let title = escape_html(title);
    match n.kind {
        NotificationKind::Like => format!("<strong>{}</strong> liked your post <em>{}</em>", actor, title),
        NotificationKind::Comment => format!("<strong>{}</strong> commented on <em>{}</em>", actor, title),
        NotificationKind::Other => String::new(),
    }
}

pub fn render_item(n: &Notification, location: &Location, now: DateTime<Utc>) -> NotificationItem {
    let name = actor_name(n.actor.as_ref());
    let avatar = n
        .actor
        .as_ref()
        .and_then(|a| a.avatar_url.clone())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| avatar_fallback(&name));
    NotificationItem {
        id: n.id.clone(),
        kind: kind_name(n.kind).to_string(),
        read: n.read,
        actor_name: name,
        actor_avatar: avatar,
        text_html: item_text(n),
        icon: icon(n.kind).to_string(),
        href: item_href(location, n),
        time_ago: time_ago(now, n.created_at),
    }
}

/// HTML fragment for one panel row. Unread rows are highlighted and carry a dot.
pub fn item_html(item: &NotificationItem) -> String {
    let emphasis = if item.read { "opacity-60" } else { "unread bg-blue-50/50" };
    let tint = if item.kind == "like" { "text-pink-500" } else { "text-blue-500" };
    let dot = if item.read {
        ""
    } else {
        r#"<span class="unread-dot w-2 h-2 bg-primary rounded-full mt-1"></span>"#
    };
    format!(
        concat!(
            r#"<div class="notif-item p-3 flex gap-3 cursor-pointer {emphasis}" data-id="{id}">"#,
            r#"<img src="{avatar}" class="w-8 h-8 rounded-full object-cover mt-1" alt="Avatar">"#,
            r#"<div class="flex-1"><p class="text-xs leading-snug">{text}</p>"#,
            r#"<p class="text-[10px] text-slate-400 mt-1">{ago}</p></div>"#,
            r#"<div class="flex flex-col items-center justify-center">"#,
            r#"<span class="material-icons text-xs {tint}">{icon}</span>{dot}</div></div>"#,
        ),
        emphasis = emphasis,
        id = escape_html(&item.id),
        avatar = escape_html(&item.actor_avatar),
        text = item.text_html,
        ago = escape_html(&item.time_ago),
        tint = tint,
        icon = item.icon,
        dot = dot,
    )
}
