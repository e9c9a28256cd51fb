//! Filesystem primitives for the ModeShape server registry
//!
//! Provides lock-protected atomic writes and format-agnostic config loading.

pub mod config;
pub mod error;
pub mod io;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
