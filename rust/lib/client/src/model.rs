//! Row types for the backend tables.
//!
//! Field names match the column names; embedded relations use the alias
//! given in the select string (`profiles:author_id(...)`, `actor:actor_id(...)`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Profiles ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Author/actor columns embedded in post, comment and notification rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

// ── Posts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub published: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Feed row: a post with its author, reactions and comment ids.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default)]
    pub profiles: Option<ProfileSummary>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub comments: Vec<CommentRef>,
}

/// Detail row: a post with its author, reactions and full comments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default)]
    pub profiles: Option<ProfileSummary>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub author_id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

// ── Comments ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub profiles: Option<ProfileSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment<'a> {
    pub post_id: &'a str,
    pub author_id: &'a str,
    pub content: &'a str,
}

// ── Reactions & bookmarks ───────────────────────────────────────────

pub const DEFAULT_REACTION: &str = "like";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "type", default = "default_reaction")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentReaction {
    pub id: String,
    pub comment_id: String,
    pub user_id: String,
    #[serde(rename = "type", default = "default_reaction")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// A bookmark joined with its post, for the saved-posts list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookmarkedPost {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub posts: Option<Post>,
}

/// Row carrying only an id, for existence checks.
#[derive(Debug, Clone, Deserialize)]
pub struct IdRow {
    pub id: String,
}

/// Outcome of an add-or-remove toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggled {
    /// True when the row now exists.
    pub active: bool,
}

fn default_reaction() -> String {
    DEFAULT_REACTION.to_string()
}

// ── Notifications ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTitle {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// A notification row. `actor` and `post` are present on list fetches
/// and absent on realtime payloads, which carry the bare row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub actor_id: Option<String>,
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<ProfileSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostTitle>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadFlag {
    pub read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_with_embeds() {
        let json = r#"{
            "id": "n1", "user_id": "u1", "actor_id": "u2", "post_id": "p1",
            "type": "like", "read": false,
            "created_at": "2025-03-01T10:00:00.123456+00:00",
            "actor": {"id": "u2", "full_name": null, "nickname": "ana", "avatar_url": null},
            "post": {"id": "p1", "title": "Hello"}
        }"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NotificationKind::Like);
        assert_eq!(n.actor.unwrap().nickname.as_deref(), Some("ana"));
        assert_eq!(n.post.unwrap().title.as_deref(), Some("Hello"));
    }

    #[test]
    fn realtime_row_without_embeds() {
        let json = r#"{"id":"n2","user_id":"u1","actor_id":"u3","post_id":null,
            "type":"comment","read":false,"created_at":"2025-03-01T10:00:00Z"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NotificationKind::Comment);
        assert!(n.actor.is_none());
        assert!(n.post_id.is_none());
    }

    #[test]
    fn unknown_notification_kind() {
        let json = r#"{"id":"n3","user_id":"u1","type":"follow","created_at":"2025-03-01T10:00:00Z"}"#;
        let n: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(n.kind, NotificationKind::Other);
        assert!(!n.read);
    }

    #[test]
    fn feed_post_flattens_columns() {
        let json = r#"{
            "id": "p1", "author_id": "u1", "title": "T", "content": "C",
            "published": true, "created_at": "2025-03-01T10:00:00Z",
            "profiles": {"id": "u1", "full_name": "Ana"},
            "reactions": [{"id": "r1", "type": "like", "user_id": "u2"}],
            "comments": [{"id": "c1"}, {"id": "c2"}]
        }"#;
        let p: FeedPost = serde_json::from_str(json).unwrap();
        assert_eq!(p.post.title, "T");
        assert_eq!(p.reactions.len(), 1);
        assert_eq!(p.comments.len(), 2);
    }

    #[test]
    fn post_update_skips_unset_fields() {
        let update = PostUpdate {
            title: Some("New".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"title":"New"}"#);
    }
}
