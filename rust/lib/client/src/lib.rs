//! Inovoid backend client.
//!
//! Typed access to the hosted backend: the PostgREST table endpoint,
//! the GoTrue identity endpoint and object storage. Authentication is
//! handled by pluggable [`TokenSource`] implementations; the signed-in
//! case is [`SessionManager`], which caches and refreshes the session.
//!
//! # Usage
//!
//! ```ignore
//! use inovoid_client::{Gateway, Project, SessionManager, AuthClient, MemorySessionStore};
//!
//! let project = Project::new("https://abc.supabase.co", "anon-key");
//! let session = Arc::new(SessionManager::new(
//!     AuthClient::new(&project),
//!     Arc::new(MemorySessionStore::default()),
//! ));
//! let gateway = Gateway::new(&project, session.clone());
//! let unread = gateway.unread_notification_count(&user_id).await?;
//! ```

pub mod auth;
pub mod error;
pub mod gateway;
pub mod gotrue;
pub mod model;
pub mod postgrest;
pub mod storage;

pub use auth::{MemorySessionStore, NoAuth, SessionManager, SessionStore, StaticToken, TokenSource};
pub use error::ApiError;
pub use gateway::Gateway;
pub use gotrue::{AuthClient, Session, SignUp, User, UserAttributes};
pub use model::*;
pub use postgrest::{PostgrestClient, QueryBuilder};
pub use storage::StorageClient;

/// Coordinates of a hosted backend project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Base URL without trailing slash, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Public anon key, sent as `apikey` on every request.
    pub anon_key: String,
}

impl Project {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Websocket endpoint of the realtime service.
    pub fn realtime_url(&self) -> String {
        let ws = if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.url.clone()
        };
        format!("{}/realtime/v1/websocket", ws)
    }
}
