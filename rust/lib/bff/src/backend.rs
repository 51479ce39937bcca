//! What the view layer needs from the outside world.
//!
//! Components take these as trait objects; the hosted backend implements
//! them through [`Gateway`], [`SessionManager`] and
//! [`RealtimeNotifications`], tests through in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use inovoid_client::gateway::NOTIFICATIONS;
use inovoid_client::{ApiError, Gateway, Notification, Profile, SessionManager, TokenSource, User};
use inovoid_realtime::{ChangeFilter, RealtimeClient, RealtimeError, Subscription};
use tracing::warn;

const NOTIFICATION_CHANNEL: &str = "public:notifications";

#[async_trait]
pub trait NotificationBackend: Send + Sync + 'static {
    async fn unread_count(&self, user_id: &str) -> Result<u64, ApiError>;
    /// Most recent notifications, newest first.
    async fn recent(&self, user_id: &str) -> Result<Vec<Notification>, ApiError>;
    async fn mark_read(&self, notification_id: &str) -> Result<(), ApiError>;
    async fn mark_all_read(&self, user_id: &str) -> Result<(), ApiError>;
}

/// Push source of newly inserted notifications for one user.
#[async_trait]
pub trait NotificationSource: Send + Sync + 'static {
    async fn subscribe(&self, user_id: &str) -> Result<Subscription<Notification>, RealtimeError>;
}

#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    async fn current_user(&self) -> Option<User>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError>;
    /// Returns the user when the backend signed them in straight away.
    async fn sign_up(&self, email: &str, password: &str, metadata: serde_json::Value) -> Result<Option<User>, ApiError>;
    async fn sign_out(&self);
    async fn update_password(&self, new_password: &str) -> Result<(), ApiError>;
}

#[async_trait]
pub trait ProfileBackend: Send + Sync + 'static {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, ApiError>;
}

#[async_trait]
impl NotificationBackend for Gateway {
    async fn unread_count(&self, user_id: &str) -> Result<u64, ApiError> {
        self.unread_notification_count(user_id).await
    }

    async fn recent(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        self.fetch_notifications(user_id).await
    }

    async fn mark_read(&self, notification_id: &str) -> Result<(), ApiError> {
        self.mark_notification_read(notification_id).await
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<(), ApiError> {
        self.mark_all_notifications_read(user_id).await
    }
}

#[async_trait]
impl ProfileBackend for Gateway {
    async fn profile(&self, user_id: &str) -> Result<Option<Profile>, ApiError> {
        self.fetch_profile(user_id).await
    }
}

#[async_trait]
impl AuthBackend for SessionManager {
    async fn current_user(&self) -> Option<User> {
        SessionManager::current_user(self).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError> {
        Ok(SessionManager::sign_in(self, email, password).await?.user)
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: serde_json::Value) -> Result<Option<User>, ApiError> {
        let result = SessionManager::sign_up(self, email, password, metadata).await?;
        Ok(result.session.map(|s| s.user))
    }

    async fn sign_out(&self) {
        SessionManager::sign_out(self).await
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ApiError> {
        SessionManager::update_password(self, new_password).await.map(|_| ())
    }
}

/// Notification inserts over the realtime websocket.
pub struct RealtimeNotifications {
    client: RealtimeClient,
    tokens: Arc<dyn TokenSource>,
}

impl RealtimeNotifications {
    pub fn new(client: RealtimeClient, tokens: Arc<dyn TokenSource>) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl NotificationSource for RealtimeNotifications {
    async fn subscribe(&self, user_id: &str) -> Result<Subscription<Notification>, RealtimeError> {
        let token = match self.tokens.token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "no access token for realtime, joining anonymously");
                None
            }
        };
        let filter = ChangeFilter::inserts("public", NOTIFICATIONS).eq("user_id", user_id);
        self.client
            .subscribe_inserts(NOTIFICATION_CHANNEL, filter, token)
            .await
    }
}
