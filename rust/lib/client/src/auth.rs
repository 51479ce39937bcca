//! Token sources and the session cache.
//!
//! Every backend request asks its [`TokenSource`] for a bearer token.
//! `Ok(None)` means anonymous: the project's anon key is sent instead.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::gotrue::{AuthClient, Session, SignUp, User, UserAttributes};

/// Refresh this many seconds before the access token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Pluggable token provider. Called before every API request.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// Anonymous requests.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// A bearer token obtained elsewhere.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

/// Where the session survives between runs.
pub trait SessionStore: Send + Sync + 'static {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: Option<&Session>);
}

/// Keeps the session in memory only.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, session: Option<&Session>) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = session.cloned();
    }
}

/// The signed-in session, refreshed on demand.
///
/// Reads take the fast path under a read lock. An expired session is
/// refreshed under the write lock after re-checking, so concurrent
/// callers trigger a single refresh.
pub struct SessionManager {
    auth: AuthClient,
    store: Arc<dyn SessionStore>,
    cached: tokio::sync::RwLock<Option<Session>>,
}

impl SessionManager {
    /// Restore any persisted session from `store`.
    pub fn new(auth: AuthClient, store: Arc<dyn SessionStore>) -> Self {
        let restored = store.load();
        Self {
            auth,
            store,
            cached: tokio::sync::RwLock::new(restored),
        }
    }

    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    /// The current session, refreshing it if the access token has expired.
    ///
    /// A failed refresh drops the session: the user is signed out.
    pub async fn session(&self) -> Result<Option<Session>, ApiError> {
        let now = chrono::Utc::now().timestamp();
        {
            let guard = self.cached.read().await;
            match guard.as_ref() {
                None => return Ok(None),
                Some(s) if s.is_fresh(now, EXPIRY_MARGIN_SECS) => return Ok(Some(s.clone())),
                Some(_) => {}
            }
        }

        let mut guard = self.cached.write().await;
        let refresh_token = match guard.as_ref() {
            None => return Ok(None),
            Some(s) if s.is_fresh(now, EXPIRY_MARGIN_SECS) => return Ok(Some(s.clone())),
            Some(s) => s.refresh_token.clone(),
        };

        debug!("access token expired, refreshing session");
        match self.auth.refresh_session(&refresh_token).await {
            Ok(fresh) => {
                self.store.save(Some(&fresh));
                *guard = Some(fresh.clone());
                Ok(Some(fresh))
            }
            Err(e) => {
                warn!(error = %e, "session refresh failed, signing out locally");
                self.store.save(None);
                *guard = None;
                Err(e)
            }
        }
    }

    /// The signed-in user, or `None`. Errors count as signed out.
    pub async fn current_user(&self) -> Option<User> {
        match self.session().await {
            Ok(session) => session.map(|s| s.user),
            Err(_) => None,
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        info!(user_id = %session.user.id, "signed in");
        self.replace(Some(session.clone())).await;
        Ok(session)
    }

    /// Register. When the backend returns a session straight away it is kept.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: serde_json::Value,
    ) -> Result<SignUp, ApiError> {
        let result = self.auth.sign_up(email, password, metadata).await?;
        if let Some(ref session) = result.session {
            self.replace(Some(session.clone())).await;
        }
        Ok(result)
    }

    /// Forget the session locally; revoke it server-side on a best-effort basis.
    pub async fn sign_out(&self) {
        let previous = self.cached.read().await.clone();
        self.replace(None).await;
        if let Some(session) = previous {
            if let Err(e) = self.auth.sign_out(&session.access_token).await {
                warn!(error = %e, "server-side sign out failed");
            }
        }
    }

    pub async fn update_password(&self, new_password: &str) -> Result<User, ApiError> {
        let session = self
            .session()
            .await?
            .ok_or_else(|| ApiError::Auth("not signed in".into()))?;
        let attrs = UserAttributes {
            password: Some(new_password.to_string()),
            ..Default::default()
        };
        self.auth.update_user(&session.access_token, &attrs).await
    }

    /// Install a session obtained elsewhere (or clear it).
    pub async fn replace(&self, session: Option<Session>) {
        self.store.save(session.as_ref());
        *self.cached.write().await = session;
    }
}

#[async_trait::async_trait]
impl TokenSource for SessionManager {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.session().await?.map(|s| s.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Project;

    fn session(expires_at: i64) -> Session {
        Session {
            access_token: "access".into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            expires_at: Some(expires_at),
            refresh_token: "refresh".into(),
            user: User {
                id: "u1".into(),
                email: Some("ana@example.com".into()),
                user_metadata: serde_json::Value::Null,
            },
        }
    }

    fn manager(store: Arc<dyn SessionStore>) -> SessionManager {
        let project = Project::new("http://127.0.0.1:9", "anon");
        SessionManager::new(AuthClient::new(&project), store)
    }

    #[tokio::test]
    async fn no_auth_returns_none() {
        assert!(NoAuth.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn static_token_returns_value() {
        let ts = StaticToken::new("jwt");
        assert_eq!(ts.token().await.unwrap(), Some("jwt".to_string()));
    }

    #[tokio::test]
    async fn restores_fresh_session_from_store() {
        let store = Arc::new(MemorySessionStore::default());
        let far_future = chrono::Utc::now().timestamp() + 3_600;
        store.save(Some(&session(far_future)));

        let m = manager(store);
        assert_eq!(m.token().await.unwrap(), Some("access".to_string()));
        assert_eq!(m.current_user().await.unwrap().id, "u1");
    }

    #[tokio::test]
    async fn empty_store_is_signed_out() {
        let m = manager(Arc::new(MemorySessionStore::default()));
        assert!(m.token().await.unwrap().is_none());
        assert!(m.current_user().await.is_none());
    }

    #[tokio::test]
    async fn failed_refresh_clears_session() {
        let store = Arc::new(MemorySessionStore::default());
        store.save(Some(&session(0)));

        // Nothing listens on port 9, so the refresh fails.
        let m = manager(store.clone());
        assert!(m.session().await.is_err());
        assert!(store.load().is_none());
        assert!(m.session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_persists() {
        let store = Arc::new(MemorySessionStore::default());
        let m = manager(store.clone());
        let far_future = chrono::Utc::now().timestamp() + 3_600;

        m.replace(Some(session(far_future))).await;
        assert!(store.load().is_some());
        m.replace(None).await;
        assert!(store.load().is_none());
    }
}
