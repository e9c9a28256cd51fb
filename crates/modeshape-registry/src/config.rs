//! Registry configuration
//!
//! Loaded from a TOML, JSON or YAML file through [`ConfigStore`]; every
//! field has a default so an absent file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use modeshape_fs::{ConfigStore, RobustnessConfig};
use modeshape_rest::HttpConfig;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::registry::DEFAULT_STATE_FILE;

/// Where and how the registry keeps its state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding the state file; defaults to `<config dir>/modeshape`
    pub state_dir: Option<PathBuf>,
    /// File name of the registry document inside `state_dir`
    pub state_file: String,
    /// How long to wait for the state file lock
    pub lock_timeout_ms: u64,
    pub rest: RestSettings,
}

/// Transport settings for the HTTP delegate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestSettings {
    pub timeout_secs: u64,
    pub user_agent: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            state_dir: None,
            state_file: DEFAULT_STATE_FILE.to_string(),
            lock_timeout_ms: 5_000,
            rest: RestSettings::default(),
        }
    }
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl RegistryConfig {
    /// Load from `path`, or return defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_or_default(path)?)
    }

    /// Default location of the config file, `<config dir>/modeshape/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("modeshape").join("config.toml"))
    }

    /// The state directory, falling back to `<config dir>/modeshape`.
    pub fn resolved_state_dir(&self) -> Option<PathBuf> {
        self.state_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join("modeshape")))
    }

    pub fn robustness(&self) -> RobustnessConfig {
        RobustnessConfig {
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
            ..RobustnessConfig::default()
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        let defaults = HttpConfig::default();
        HttpConfig {
            timeout: Duration::from_secs(self.rest.timeout_secs),
            user_agent: self.rest.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }
}
