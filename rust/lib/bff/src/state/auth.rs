use inovoid_flux::State;
use serde::{Deserialize, Serialize};

/// Authentication state, stored at `auth/state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub user: Option<AuthUser>,
    pub busy: bool,
    pub error: Option<String>,
}

impl State for AuthState {
    const PATH: &'static str = "auth/state";
}

impl AuthState {
    pub fn signed_out() -> Self {
        Self {
            phase: AuthPhase::SignedOut,
            user: None,
            busy: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthPhase {
    SignedOut,
    SignedIn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
}

/// What the navigation bar shows, stored at `auth/nav`.
///
/// Backs the `data-auth="logged-in"` / `data-auth="logged-out"` toggles and
/// the `data-auth-avatar` / `data-auth-name` slots.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NavAuth {
    pub logged_in: bool,
    pub avatar_url: Option<String>,
    pub display_name: Option<String>,
}

impl State for NavAuth {
    const PATH: &'static str = "auth/nav";
}
