//! Client configuration.
//!
//! Layers, lowest priority first:
//! 1. Compiled defaults
//! 2. `~/.classhub/config.json`
//! 3. `CLASSHUB_*` environment variables
//! 4. CLI flags (applied by the binary)

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::context::{Role, UserContext};

/// Directory under the home directory holding client state.
const CONFIG_DIR: &str = ".classhub";
const CONFIG_FILE: &str = "config.json";

/// Default port of the bundled dev backend.
pub const DEFAULT_PORT: u16 = 58231;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Id of the signed-in user.
    pub user_id: Option<String>,
    /// Role of the signed-in user.
    pub role: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: format!("http://127.0.0.1:{DEFAULT_PORT}"),
            timeout_secs: 30,
            user_id: None,
            role: None,
        }
    }
}

impl Config {
    /// Load from the default path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from a specific path. Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Apply `CLASSHUB_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CLASSHUB_BASE_URL") {
            self.base_url = url;
        }
        if let Some(secs) = lookup("CLASSHUB_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!(value = %secs, "ignoring invalid CLASSHUB_TIMEOUT_SECS"),
            }
        }
        if let Some(user) = lookup("CLASSHUB_USER") {
            self.user_id = Some(user);
        }
        if let Some(role) = lookup("CLASSHUB_ROLE") {
            self.role = Some(role);
        }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The viewer described by this config. Without a user, everything is visible.
    pub fn user_context(&self) -> UserContext {
        match (&self.user_id, &self.role) {
            (Some(user), Some(role)) => UserContext::new(user.clone(), Role::parse(role)),
            (Some(user), None) => UserContext::new(user.clone(), Role::Admin),
            (None, Some(role)) => {
                tracing::warn!(role = %role, "role set without a user id, showing every session");
                UserContext::admin()
            }
            (None, None) => UserContext::admin(),
        }
    }

    /// Reject a teacher or student role that has no user id to scope by.
    pub fn check_viewer(&self) -> Result<()> {
        let scoped = self
            .role
            .as_deref()
            .map(Role::parse)
            .filter(|r| matches!(r, Role::Teacher | Role::Student));
        if let (Some(role), None) = (scoped, &self.user_id) {
            anyhow::bail!("role '{role}' needs a user id: pass --user or set CLASSHUB_USER");
        }
        Ok(())
    }
}

/// `~/.classhub/config.json`, if a home directory exists.
pub fn default_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}
