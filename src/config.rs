//! Ambient configuration: a small TOML file read at startup by the `cli`
//! binary. Library consumers embedding the engine elsewhere are free to
//! construct [`GitTutorConfig`] directly and skip the file entirely.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TutorError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitTutorConfig {
    /// Passed to `env_logger`'s default filter when the `RUST_LOG`
    /// environment variable isn't set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// URL of the remote lessons 5 and 6 clone from.
    #[serde(default = "default_seed_remote_url")]
    pub seed_remote_url: String,
    /// Whether badge sync runs automatically after every dispatched
    /// command, or is left to the host UI to call explicitly.
    #[serde(default = "default_true")]
    pub auto_sync_badges: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_seed_remote_url() -> String {
    crate::repo::git_commands::SEED_REMOTE_URL.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GitTutorConfig {
    fn default() -> Self {
        GitTutorConfig {
            log_level: default_log_level(),
            seed_remote_url: default_seed_remote_url(),
            auto_sync_badges: default_true(),
        }
    }
}

impl GitTutorConfig {
    pub fn load(path: &Path) -> Result<Self, TutorError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), TutorError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
