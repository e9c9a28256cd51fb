//! Registry context shared by all commands
//!
//! Resolves the configuration, builds the HTTP delegate and restores the
//! registry from its state file before a command runs.

use std::path::PathBuf;
use std::sync::Arc;

use modeshape_registry::{HttpRestDelegate, RegistryConfig, ServerRegistry, Status};

use crate::commands::print_status;
use crate::error::{CliError, Result};

/// A registry restored from its state file.
pub struct Context {
    pub registry: ServerRegistry,
}

impl Context {
    /// Load configuration, apply overrides and restore saved servers.
    ///
    /// Warnings from the restore (skipped entries, duplicates) are printed
    /// but do not stop the command.
    pub fn load(config_path: Option<PathBuf>, state_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path.or_else(RegistryConfig::default_path) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading configuration");
                RegistryConfig::load(&path)?
            }
            None => RegistryConfig::default(),
        };
        if let Some(dir) = state_dir {
            config.state_dir = Some(dir);
        }

        let delegate = Arc::new(HttpRestDelegate::new(config.http_config()));
        let registry = ServerRegistry::from_config(&config, delegate);
        if registry.state_path().is_none() {
            return Err(CliError::user(
                "No state directory available; pass --state-dir",
            ));
        }

        let status = registry.restore_state()?;
        if !status.is_ok() {
            print_status(&status);
        }

        Ok(Self { registry })
    }

    /// Persist the registry after a successful mutation.
    pub fn save(&self) -> Result<Status> {
        Ok(self.registry.save_state()?)
    }
}
