//! Per-entity operations against the backend tables and buckets.
//!
//! Add-or-remove toggles (reactions, comment reactions, bookmarks) look
//! the row up and then insert or delete it. Two tabs toggling the same
//! row at once can both see "absent" and both insert; the table's unique
//! constraint rejects the second insert, which surfaces as an error to
//! that caller.

use std::sync::Arc;

use tracing::debug;

use crate::auth::TokenSource;
use crate::error::ApiError;
use crate::model::*;
use crate::postgrest::PostgrestClient;
use crate::storage::{self, StorageClient, AVATARS_BUCKET, POST_COVERS_BUCKET};
use crate::Project;

pub const POSTS: &str = "posts";
pub const COMMENTS: &str = "comments";
pub const REACTIONS: &str = "reactions";
pub const COMMENT_REACTIONS: &str = "comment_reactions";
pub const PROFILES: &str = "profiles";
pub const BOOKMARKS: &str = "bookmarks";
pub const NOTIFICATIONS: &str = "notifications";

/// Notifications shown in the panel.
pub const NOTIFICATION_PAGE: usize = 20;

const AUTHOR: &str = "profiles:author_id (id, full_name, nickname, avatar_url)";

const FEED_SELECT: &str = "*,
    profiles:author_id (id, full_name, nickname, avatar_url),
    reactions:reactions (id, type, user_id),
    comments:comments (id)";

const DETAIL_SELECT: &str = "*,
    profiles:author_id (id, full_name, nickname, avatar_url, bio),
    reactions:reactions (id, type, user_id),
    comments:comments (id, content, created_at, profiles:author_id (id, full_name, nickname, avatar_url))";

const NOTIFICATION_SELECT: &str = "*,
    actor:actor_id (id, full_name, nickname, avatar_url),
    post:post_id (id, title)";

/// The remote data gateway.
#[derive(Clone)]
pub struct Gateway {
    rest: PostgrestClient,
    storage: StorageClient,
}

impl Gateway {
    pub fn new(project: &Project, token_source: Arc<dyn TokenSource>) -> Self {
        let http = reqwest::Client::new();
        Self {
            rest: PostgrestClient::with_http(http.clone(), project, token_source.clone()),
            storage: StorageClient::with_http(http, project, token_source),
        }
    }

    pub fn rest(&self) -> &PostgrestClient {
        &self.rest
    }

    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    // ── Posts ───────────────────────────────────────────────────────

    /// Published posts, newest first, `limit` rows starting at `offset`.
    /// A zero `limit` is an empty page and makes no request.
    pub async fn fetch_published_posts(&self, limit: usize, offset: usize) -> Result<Vec<FeedPost>, ApiError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.rest
            .from(POSTS)
            .select(FEED_SELECT)
            .eq("published", true)
            .order("created_at", false)
            .range(offset, offset.saturating_add(limit - 1))
            .execute()
            .await
    }

    pub async fn fetch_post_by_id(&self, post_id: &str) -> Result<Option<PostDetail>, ApiError> {
        self.rest
            .from(POSTS)
            .select(DETAIL_SELECT)
            .eq("id", post_id)
            .single()
            .await
    }

    pub async fn fetch_user_posts(&self, user_id: &str) -> Result<Vec<Post>, ApiError> {
        self.rest
            .from(POSTS)
            .select("*")
            .eq("author_id", user_id)
            .order("created_at", false)
            .execute()
            .await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.rest.from(POSTS).select("*").insert(post).await
    }

    pub async fn update_post(&self, post_id: &str, updates: &PostUpdate) -> Result<Post, ApiError> {
        self.rest
            .from(POSTS)
            .eq("id", post_id)
            .select("*")
            .update(updates)
            .await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<(), ApiError> {
        self.rest.from(POSTS).eq("id", post_id).delete().await
    }

    // ── Comments ────────────────────────────────────────────────────

    /// Comments on a post, oldest first.
    pub async fn fetch_comments(&self, post_id: &str) -> Result<Vec<Comment>, ApiError> {
        self.rest
            .from(COMMENTS)
            .select(&format!("*, {}", AUTHOR))
            .eq("post_id", post_id)
            .order("created_at", true)
            .execute()
            .await
    }

    pub async fn add_comment(&self, post_id: &str, author_id: &str, content: &str) -> Result<Comment, ApiError> {
        let row = NewComment {
            post_id,
            author_id,
            content,
        };
        self.rest
            .from(COMMENTS)
            .select(&format!("*, {}", AUTHOR))
            .insert(&row)
            .await
    }

    pub async fn delete_comment(&self, comment_id: &str) -> Result<(), ApiError> {
        self.rest.from(COMMENTS).eq("id", comment_id).delete().await
    }

    // ── Reactions ───────────────────────────────────────────────────

    pub async fn toggle_reaction(&self, post_id: &str, user_id: &str, kind: &str) -> Result<Toggled, ApiError> {
        let existing: Vec<IdRow> = self
            .rest
            .from(REACTIONS)
            .select("id")
            .eq("post_id", post_id)
            .eq("user_id", user_id)
            .limit(1)
            .execute()
            .await?;

        if let Some(row) = existing.first() {
            self.rest.from(REACTIONS).eq("id", &row.id).delete().await?;
            debug!(post_id, user_id, "reaction removed");
            return Ok(Toggled { active: false });
        }

        self.rest
            .from(REACTIONS)
            .insert_silent(&serde_json::json!({
                "post_id": post_id,
                "user_id": user_id,
                "type": kind,
            }))
            .await?;
        debug!(post_id, user_id, kind, "reaction added");
        Ok(Toggled { active: true })
    }

    pub async fn reaction_count(&self, post_id: &str) -> Result<u64, ApiError> {
        self.rest.from(REACTIONS).select("*").eq("post_id", post_id).count().await
    }

    pub async fn has_user_reacted(&self, post_id: &str, user_id: &str) -> Result<bool, ApiError> {
        let rows: Vec<IdRow> = self
            .rest
            .from(REACTIONS)
            .select("id")
            .eq("post_id", post_id)
            .eq("user_id", user_id)
            .limit(1)
            .execute()
            .await?;
        Ok(!rows.is_empty())
    }

    // ── Comment reactions ───────────────────────────────────────────

    pub async fn toggle_comment_reaction(
        &self,
        comment_id: &str,
        user_id: &str,
        kind: &str,
    ) -> Result<Toggled, ApiError> {
        let existing: Vec<IdRow> = self
            .rest
            .from(COMMENT_REACTIONS)
            .select("id")
            .eq("comment_id", comment_id)
            .eq("user_id", user_id)
            .limit(1)
            .execute()
            .await?;

        if let Some(row) = existing.first() {
            self.rest.from(COMMENT_REACTIONS).eq("id", &row.id).delete().await?;
            return Ok(Toggled { active: false });
        }

        self.rest
            .from(COMMENT_REACTIONS)
            .insert_silent(&serde_json::json!({
                "comment_id": comment_id,
                "user_id": user_id,
                "type": kind,
            }))
            .await?;
        Ok(Toggled { active: true })
    }

    pub async fn comment_reaction_count(&self, comment_id: &str) -> Result<u64, ApiError> {
        self.rest
            .from(COMMENT_REACTIONS)
            .select("*")
            .eq("comment_id", comment_id)
            .count()
            .await
    }

    pub async fn fetch_comment_reactions(&self, comment_id: &str) -> Result<Vec<CommentReaction>, ApiError> {
        self.rest
            .from(COMMENT_REACTIONS)
            .select("*")
            .eq("comment_id", comment_id)
            .execute()
            .await
    }

    // ── Bookmarks ───────────────────────────────────────────────────

    pub async fn toggle_bookmark(&self, post_id: &str, user_id: &str) -> Result<Toggled, ApiError> {
        let existing: Vec<IdRow> = self
            .rest
            .from(BOOKMARKS)
            .select("id")
            .eq("post_id", post_id)
            .eq("user_id", user_id)
            .limit(1)
            .execute()
            .await?;

        if let Some(row) = existing.first() {
            self.rest.from(BOOKMARKS).eq("id", &row.id).delete().await?;
            return Ok(Toggled { active: false });
        }

        self.rest
            .from(BOOKMARKS)
            .insert_silent(&serde_json::json!({ "post_id": post_id, "user_id": user_id }))
            .await?;
        Ok(Toggled { active: true })
    }

    pub async fn is_bookmarked(&self, post_id: &str, user_id: &str) -> Result<bool, ApiError> {
        let rows: Vec<IdRow> = self
            .rest
            .from(BOOKMARKS)
            .select("id")
            .eq("post_id", post_id)
            .eq("user_id", user_id)
            .limit(1)
            .execute()
            .await?;
        Ok(!rows.is_empty())
    }

    /// A user's saved posts, most recently saved first.
    pub async fn fetch_bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkedPost>, ApiError> {
        self.rest
            .from(BOOKMARKS)
            .select("id, created_at, posts:post_id (*)")
            .eq("user_id", user_id)
            .order("created_at", false)
            .execute()
            .await
    }

    // ── Profiles ────────────────────────────────────────────────────

    pub async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, ApiError> {
        self.rest
            .from(PROFILES)
            .select("*")
            .eq("id", user_id)
            .single()
            .await
    }

    pub async fn update_profile(&self, user_id: &str, updates: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.rest
            .from(PROFILES)
            .eq("id", user_id)
            .select("*")
            .update(updates)
            .await
    }

    // ── Storage ─────────────────────────────────────────────────────

    pub async fn upload_image(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ApiError> {
        self.storage.upload(bucket, path, bytes, content_type).await
    }

    /// Stored at `{user_id}/avatar.{ext}`, so a new upload replaces the old one.
    pub async fn upload_avatar(&self, user_id: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let path = avatar_path(user_id, file_name);
        self.upload_image(AVATARS_BUCKET, &path, bytes, storage::image_content_type(file_name))
            .await
    }

    /// Stored at `{user_id}/{unix_millis}.{ext}`.
    pub async fn upload_post_cover(&self, user_id: &str, file_name: &str, bytes: Vec<u8>) -> Result<String, ApiError> {
        let millis = chrono::Utc::now().timestamp_millis();
        let path = cover_path(user_id, file_name, millis);
        self.upload_image(POST_COVERS_BUCKET, &path, bytes, storage::image_content_type(file_name))
            .await
    }

    // ── Notifications ───────────────────────────────────────────────

    /// The most recent notifications for a user, newest first, with actor and post embedded.
    pub async fn fetch_notifications(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        self.rest
            .from(NOTIFICATIONS)
            .select(NOTIFICATION_SELECT)
            .eq("user_id", user_id)
            .order("created_at", false)
            .limit(NOTIFICATION_PAGE)
            .execute()
            .await
    }

    pub async fn unread_notification_count(&self, user_id: &str) -> Result<u64, ApiError> {
        self.rest
            .from(NOTIFICATIONS)
            .select("*")
            .eq("user_id", user_id)
            .eq("read", false)
            .count()
            .await
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.rest
            .from(NOTIFICATIONS)
            .eq("id", notification_id)
            .update_silent(&ReadFlag { read: true })
            .await
    }

    pub async fn mark_all_notifications_read(&self, user_id: &str) -> Result<(), ApiError> {
        self.rest
            .from(NOTIFICATIONS)
            .eq("user_id", user_id)
            .eq("read", false)
            .update_silent(&ReadFlag { read: true })
            .await
    }
}

pub fn avatar_path(user_id: &str, file_name: &str) -> String {
    format!("{}/avatar.{}", user_id, storage::file_extension(file_name))
}

pub fn cover_path(user_id: &str, file_name: &str, unix_millis: i64) -> String {
    format!("{}/{}.{}", user_id, unix_millis, storage::file_extension(file_name))
}
