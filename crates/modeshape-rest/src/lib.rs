//! ModeShape REST model and delegate.
//!
//! This crate defines the values the server registry hands around
//! ([`Server`], [`Repository`], [`Workspace`]), the [`Status`] report type,
//! the [`RestDelegate`] seam for network calls and an HTTP implementation
//! of it.

pub mod delegate;
pub mod error;
pub mod http;
pub mod model;
pub mod status;

pub use delegate::RestDelegate;
pub use error::{RestError, Result};
pub use http::{HttpConfig, HttpRestDelegate};
pub use model::{QueryRow, Repository, Server, Workspace};
pub use status::{Severity, Status};
