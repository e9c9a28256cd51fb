//! Shared test utilities for the modeshape-registry workspace.
//!
//! This crate provides fixtures used across crate test suites. It is a
//! dev-dependency only and never published.
//!
//! # Modules
//!
//! - [`delegate`]: [`MockRestDelegate`], an in-memory stand-in for a ModeShape server
//! - [`state`]: [`TestStateDir`], a temporary registry state directory

pub mod delegate;
pub mod state;

pub use delegate::{MockRestDelegate, PublishCall};
pub use state::TestStateDir;

use modeshape_rest::Server;

/// A server without password, the common case in tests.
pub fn server(url: &str, user: &str) -> Server {
    Server::new(url, user, None, false)
}
