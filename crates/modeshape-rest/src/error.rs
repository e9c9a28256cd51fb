//! Error types for modeshape-rest

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, RestError>;

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Authentication failed for {user} at {url}")]
    Unauthorized { url: String, user: String },

    #[error("Resource not found: {url}")]
    NotFound { url: String },

    #[error("Server responded {status} for {url}: {body}")]
    Http { url: String, status: u16, body: String },

    #[error("Transport error talking to {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("Cannot read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RestError {
    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(url: &str, user: &str, status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized {
                url: url.to_string(),
                user: user.to_string(),
            },
            404 => Self::NotFound {
                url: url.to_string(),
            },
            _ => Self::Http {
                url: url.to_string(),
                status,
                body,
            },
        }
    }
}
