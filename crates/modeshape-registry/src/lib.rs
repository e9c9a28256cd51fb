//! Registry of ModeShape servers.
//!
//! [`ServerRegistry`] keeps the known servers behind a reader-writer lock,
//! notifies [`RegistryListener`]s of changes, persists itself to an XML
//! file and routes repository, workspace and publishing calls through a
//! [`RestDelegate`] once a server is registered.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use modeshape_registry::{HttpRestDelegate, Server, ServerRegistry};
//!
//! let registry = ServerRegistry::new(Arc::new(HttpRestDelegate::default()))
//!     .with_state_location("/tmp/modeshape");
//! registry.restore_state()?;
//! registry.add_server(Server::new("http://localhost:8080/modeshape-rest", "admin", None, false))?;
//! registry.save_state()?;
//! # Ok::<(), modeshape_registry::RegistryError>(())
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod persistence;
pub mod registry;
pub mod validation;

pub use config::{RegistryConfig, RestSettings};
pub use error::{RegistryError, Result};
pub use event::{
    ChannelListener, EventKind, ListenerError, RegistryEvent, RegistryListener, ServerChange,
};
pub use registry::{DEFAULT_STATE_FILE, ServerRegistry};
pub use validation::{
    ValidationError, is_password_valid, is_server_valid, is_url_valid, is_user_valid,
};

pub use modeshape_rest::{
    HttpConfig, HttpRestDelegate, QueryRow, Repository, RestDelegate, RestError, Server,
    Severity, Status, Workspace,
};
