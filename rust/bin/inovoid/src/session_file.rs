//! Session persisted as JSON between runs.

use std::path::PathBuf;

use inovoid_client::{Session, SessionStore};
use tracing::{debug, warn};

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn write(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                None
            }
        }
    }

    fn save(&self, session: Option<&Session>) {
        match session {
            Some(session) => {
                if let Err(e) = self.write(session) {
                    warn!(path = %self.path.display(), error = %e, "session not saved");
                }
            }
            None => {
                if self.path.exists() {
                    if let Err(e) = std::fs::remove_file(&self.path) {
                        warn!(path = %self.path.display(), error = %e, "session file not removed");
                    }
                }
            }
        }
        debug!(path = %self.path.display(), signed_in = session.is_some(), "session persisted");
    }
}
