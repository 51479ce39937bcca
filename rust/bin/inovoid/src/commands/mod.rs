//! Subcommand implementations.

pub mod auth;
pub mod notifications;
pub mod theme;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use inovoid_bff::{Location, SessionGuard};
use inovoid_client::{AuthClient, Gateway, Project, SessionManager, User};
use inovoid_flux::Flux;
use tracing::debug;

use crate::config::{self, AppConfig};
use crate::session_file::FileSessionStore;

/// The terminal plays the part of a page at the site root.
const CLI_LOCATION: &str = "/";

/// Backend handles shared by the commands of one invocation.
pub struct Runtime {
    pub project: Project,
    pub session: Arc<SessionManager>,
    pub gateway: Arc<Gateway>,
}

impl Runtime {
    pub fn open(config_path: &Path) -> Result<Self> {
        let config = AppConfig::resolve(config_path)?;
        let project = Project::new(config.supabase_url, config.supabase_anon_key);
        let store = Arc::new(FileSessionStore::new(config::session_path(config_path)));
        let session = Arc::new(SessionManager::new(AuthClient::new(&project), store));
        let gateway = Arc::new(Gateway::new(&project, session.clone()));
        debug!(url = %project.url, "runtime ready");
        Ok(Self {
            project,
            session,
            gateway,
        })
    }

    pub fn location(&self) -> Location {
        Location::new(CLI_LOCATION)
    }

    /// A session guard over a fresh flux store, without notifications.
    pub fn guard(&self, flux: &Flux) -> Arc<SessionGuard> {
        Arc::new(SessionGuard::new(
            self.session.clone(),
            self.gateway.clone(),
            Arc::clone(flux.store()),
            self.location(),
        ))
    }

    /// The signed-in user, or an error telling how to sign in.
    pub async fn require_user(&self) -> Result<User> {
        self.session
            .current_user()
            .await
            .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `inovoid login --email <email>`."))
    }
}
