//! Error types for modeshape-registry

use std::path::PathBuf;

use crate::validation::ValidationError;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Server already exists: {server}")]
    ServerExists { server: String },

    #[error("Server not found: {server}")]
    ServerNotFound { server: String },

    /// Calling a network operation for a server nobody registered is a
    /// caller bug, not a runtime condition.
    #[error("Server is not registered: {server}")]
    NotRegistered { server: String },

    /// The old server was removed but the replacement could not be added.
    #[error("Update removed {removed} but could not add its replacement: {source}")]
    UpdateIncomplete {
        removed: String,
        #[source]
        source: Box<RegistryError>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rest(#[from] modeshape_rest::RestError),

    #[error("Filesystem error: {0}")]
    Fs(#[from] modeshape_fs::Error),

    #[error("Invalid registry file {path}: {message}")]
    Persistence { path: PathBuf, message: String },
}
