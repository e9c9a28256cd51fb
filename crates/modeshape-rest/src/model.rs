//! Servers, repositories and workspaces

use std::collections::BTreeMap;
use std::fmt;

/// A ModeShape server a user can publish to.
///
/// Two servers are the *same registry entry* when their URL and user match,
/// regardless of password; see [`Server::has_same_key`]. `PartialEq` compares
/// every field.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Server {
    url: String,
    user: String,
    password: Option<String>,
    persist_password: bool,
}

impl Server {
    pub fn new(
        url: impl Into<String>,
        user: impl Into<String>,
        password: Option<String>,
        persist_password: bool,
    ) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password,
            persist_password,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Whether the password is written to the registry file.
    pub fn persist_password(&self) -> bool {
        self.persist_password
    }

    /// True when `other` names the same (URL, user) registry key.
    pub fn has_same_key(&self, other: &Server) -> bool {
        self.matches(&other.url, &other.user)
    }

    pub fn matches(&self, url: &str, user: &str) -> bool {
        self.url == url && self.user == user
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("persist_password", &self.persist_password)
            .finish()
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.url)
    }
}

/// A JCR repository hosted by one server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    name: String,
    server: Server,
}

impl Repository {
    pub fn new(name: impl Into<String>, server: Server) -> Self {
        Self {
            name: name.into(),
            server,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server(&self) -> &Server {
        &self.server
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.server)
    }
}

/// A workspace inside one repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Workspace {
    name: String,
    repository: Repository,
}

impl Workspace {
    pub fn new(name: impl Into<String>, repository: Repository) -> Self {
        Self {
            name: name.into(),
            repository,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn server(&self) -> &Server {
        self.repository.server()
    }
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.repository, self.name)
    }
}

/// One row of a query result, keyed by column name.
pub type QueryRow = BTreeMap<String, String>;
