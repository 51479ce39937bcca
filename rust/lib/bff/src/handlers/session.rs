//! Session guard: page gating, navigation auth state and sign-in flows.

use std::sync::Arc;

use inovoid_client::User;
use inovoid_flux::{Flux, StateStore, SubscriptionId};
use rand::Rng;
use serde_json::json;
use tracing::{info, warn};

use crate::backend::{AuthBackend, ProfileBackend};
use crate::handlers::notifications::Notifications;
use crate::handlers::toast::{navigate, show_toast};
use crate::location::Location;
use crate::request::{RefreshNavReq, SignInReq, SignOutReq, SignUpReq, UpdatePasswordReq};
use crate::state::{AuthPhase, AuthState, AuthUser, NavAuth, ToastKind};

const NICKNAME_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `user_` followed by six random lowercase letters or digits.
pub fn random_nickname() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| NICKNAME_CHARS[rng.gen_range(0..NICKNAME_CHARS.len())] as char)
        .collect();
    format!("user_{}", suffix)
}

pub struct SessionGuard {
    auth: Arc<dyn AuthBackend>,
    profiles: Arc<dyn ProfileBackend>,
    notifications: Option<Arc<Notifications>>,
    store: Arc<StateStore>,
    location: Location,
}

impl SessionGuard {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        profiles: Arc<dyn ProfileBackend>,
        store: Arc<StateStore>,
        location: Location,
    ) -> Self {
        Self {
            auth,
            profiles,
            notifications: None,
            store,
            location,
        }
    }

    /// Start notifications for whoever signs in.
    pub fn with_notifications(mut self, notifications: Arc<Notifications>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn base_path(&self) -> &'static str {
        self.location.base_path()
    }

    pub fn pages_path(&self) -> &'static str {
        self.location.pages_path()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.auth.current_user().await
    }

    /// The signed-in user; otherwise route to the login page.
    pub async fn require_auth(&self) -> Option<User> {
        let user = self.auth.current_user().await;
        if user.is_none() {
            navigate(&self.store, format!("{}login.html", self.pages_path()));
        }
        user
    }

    /// Send signed-in users from the login and signup pages to the feed.
    pub async fn redirect_if_logged_in(&self) -> bool {
        if self.auth.current_user().await.is_some() {
            navigate(&self.store, "feed.html");
            return true;
        }
        false
    }

    /// Reflect the session into `auth/nav`, and start notifications when
    /// signed in.
    pub async fn update_nav_auth(&self) {
        let Some(user) = self.auth.current_user().await else {
            self.store.set(NavAuth::default());
            return;
        };

        let profile = match self.profiles.profile(&user.id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "profile fetch failed");
                None
            }
        };
        let avatar_url = profile.as_ref().and_then(|p| p.avatar_url.clone());
        let display_name = profile
            .as_ref()
            .and_then(|p| p.full_name.clone())
            .filter(|n| !n.is_empty())
            .or_else(|| user.email.clone());
        self.store.set(NavAuth {
            logged_in: true,
            avatar_url,
            display_name,
        });

        if let Some(notifications) = &self.notifications {
            notifications.initialize(&user.id).await;
        }
    }

    fn set_busy(&self) {
        let mut state = self
            .store
            .get::<AuthState>()
            .map(|s| (*s).clone())
            .unwrap_or_else(AuthState::signed_out);
        state.busy = true;
        state.error = None;
        self.store.set(state);
    }

    fn set_signed_in(&self, user: &User) {
        self.store.set(AuthState {
            phase: AuthPhase::SignedIn,
            user: Some(AuthUser {
                id: user.id.clone(),
                email: user.email.clone(),
            }),
            busy: false,
            error: None,
        });
    }

    fn set_failed(&self, message: String) {
        let mut state = self
            .store
            .get::<AuthState>()
            .map(|s| (*s).clone())
            .unwrap_or_else(AuthState::signed_out);
        state.busy = false;
        state.error = Some(message);
        self.store.set(state);
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> bool {
        self.set_busy();
        match self.auth.sign_in(email, password).await {
            Ok(user) => {
                info!(user_id = %user.id, "signed in");
                self.set_signed_in(&user);
                self.update_nav_auth().await;
                true
            }
            Err(e) => {
                warn!(error = %e, "sign in failed");
                self.set_failed(e.to_string());
                false
            }
        }
    }

    /// Register with `full_name` and a generated nickname.
    pub async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> bool {
        self.set_busy();
        let metadata = json!({
            "full_name": full_name,
            "nickname": random_nickname(),
        });
        match self.auth.sign_up(email, password, metadata).await {
            Ok(Some(user)) => {
                info!(user_id = %user.id, "signed up");
                self.set_signed_in(&user);
                self.update_nav_auth().await;
                true
            }
            Ok(None) => {
                info!("signed up, awaiting email confirmation");
                self.store.set(AuthState::signed_out());
                true
            }
            Err(e) => {
                warn!(error = %e, "sign up failed");
                self.set_failed(e.to_string());
                false
            }
        }
    }

    /// Forget the session and return to the landing page.
    pub async fn sign_out(&self) {
        if let Some(notifications) = &self.notifications {
            notifications.teardown();
        }
        self.auth.sign_out().await;
        self.store.set(AuthState::signed_out());
        self.store.set(NavAuth::default());
        navigate(&self.store, format!("{}index.html", self.base_path()));
        info!("signed out");
    }

    pub async fn update_password(&self, new_password: &str) -> bool {
        match self.auth.update_password(new_password).await {
            Ok(()) => {
                show_toast(&self.store, "Password updated", ToastKind::Success);
                true
            }
            Err(e) => {
                warn!(error = %e, "password update failed");
                self.set_failed(e.to_string());
                show_toast(&self.store, e.to_string(), ToastKind::Error);
                false
            }
        }
    }

    /// Observe sign-in and sign-out.
    pub fn on_auth_state_change<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        self.store.watch::<AuthState, F>(handler)
    }

    pub fn register(self: &Arc<Self>, flux: &Flux) {
        {
            let this = Arc::clone(self);
            flux.on::<SignInReq, _, _>(move |req, _| {
                let this = Arc::clone(&this);
                async move {
                    this.sign_in(&req.email, &req.password).await;
                }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<SignUpReq, _, _>(move |req, _| {
                let this = Arc::clone(&this);
                async move {
                    this.sign_up(&req.email, &req.password, &req.full_name).await;
                }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<SignOutReq, _, _>(move |_, _| {
                let this = Arc::clone(&this);
                async move { this.sign_out().await }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<UpdatePasswordReq, _, _>(move |req, _| {
                let this = Arc::clone(&this);
                async move {
                    this.update_password(&req.new_password).await;
                }
            });
        }
        {
            let this = Arc::clone(self);
            flux.on::<RefreshNavReq, _, _>(move |_, _| {
                let this = Arc::clone(&this);
                async move { this.update_nav_auth().await }
            });
        }
    }
}
