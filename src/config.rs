//! Configuration Management
//!
//! Handles persistent user configuration for restcall.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// State file used when `--state` is not given
    #[serde(default)]
    pub state_path: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("restcall").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Get effective state file (CLI > config > default location)
    pub fn effective_state_path(&self, cli: Option<&Path>) -> PathBuf {
        cli.map(Path::to_path_buf)
            .or_else(|| self.state_path.clone())
            .unwrap_or_else(default_state_path)
    }
}

/// Directory holding restcall's own files
pub fn app_dir() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("restcall");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".restcall");
    }
    PathBuf::from(".")
}

fn default_state_path() -> PathBuf {
    app_dir().join("state.json")
}
