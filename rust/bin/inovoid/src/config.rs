//! Client configuration.
//!
//! Reads/writes `~/.inovoid/config.toml`. The session and preferences live
//! next to it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const ENV_URL: &str = "INOVOID_SUPABASE_URL";
pub const ENV_ANON_KEY: &str = "INOVOID_SUPABASE_ANON_KEY";

const PLACEHOLDER_PREFIX: &str = "YOUR_SUPABASE_";

/// Backend project coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub supabase_url: String,

    #[serde(default)]
    pub supabase_anon_key: String,
}

impl AppConfig {
    /// Default config file path: ~/.inovoid/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if the file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overlay non-empty values from `lookup` (the process environment in
    /// production).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.supabase_url = url;
        }
        if let Some(key) = lookup(ENV_ANON_KEY).filter(|v| !v.is_empty()) {
            self.supabase_anon_key = key;
        }
    }

    /// Both values present and not the shipped placeholders.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value, env) in [
            ("supabase_url", &self.supabase_url, ENV_URL),
            ("supabase_anon_key", &self.supabase_anon_key, ENV_ANON_KEY),
        ] {
            if value.trim().is_empty() {
                anyhow::bail!("{} is not set. Add it to the config file or set {}.", name, env);
            }
            if value.starts_with(PLACEHOLDER_PREFIX) {
                anyhow::bail!("{} still holds the placeholder {:?}.", name, value);
            }
        }
        Ok(())
    }

    /// File, then environment, then validation.
    pub fn resolve(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env(|k| std::env::var(k).ok());
        config.validate()?;
        Ok(config)
    }
}

/// Persisted session, next to the config file.
pub fn session_path(config_path: &Path) -> PathBuf {
    sibling(config_path, "session.json")
}

/// Persisted preferences, next to the config file.
pub fn prefs_path(config_path: &Path) -> PathBuf {
    sibling(config_path, "prefs.toml")
}

fn sibling(config_path: &Path, name: &str) -> PathBuf {
    config_path
        .parent()
        .map(|dir| dir.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Return the Inovoid config directory (~/.inovoid).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".inovoid")
}
