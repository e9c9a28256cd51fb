//! [`MockRestDelegate`] for registry tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use modeshape_rest::{
    QueryRow, Repository, RestDelegate, RestError, Result, Server, Status, Workspace,
};
use url::Url;

/// One recorded `publish` or `unpublish` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCall {
    pub workspace: String,
    pub path: String,
    pub file: PathBuf,
    /// `None` for unpublish
    pub versionable: Option<bool>,
}

/// In-memory delegate answering from configured listings.
///
/// # Example
///
/// ```rust
/// use modeshape_test_utils::{MockRestDelegate, server};
/// use modeshape_rest::RestDelegate;
///
/// let delegate = MockRestDelegate::new()
///     .with_repositories("http://h:8080", &["sample"])
///     .with_workspaces("sample", &["default", "other"]);
///
/// let repos = delegate.repositories(&server("http://h:8080", "admin")).unwrap();
/// assert_eq!(repos[0].name(), "sample");
/// ```
#[derive(Default)]
pub struct MockRestDelegate {
    repositories: HashMap<String, Vec<String>>,
    workspaces: HashMap<String, Vec<String>>,
    unreachable: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    published: Mutex<Vec<PublishCall>>,
}

impl MockRestDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repositories reported for the server at `url`.
    pub fn with_repositories(mut self, url: &str, names: &[&str]) -> Self {
        self.repositories
            .insert(url.to_string(), names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Workspaces reported for every repository named `repository`.
    pub fn with_workspaces(mut self, repository: &str, names: &[&str]) -> Self {
        self.workspaces.insert(
            repository.to_string(),
            names.iter().map(|n| n.to_string()).collect(),
        );
        self
    }

    /// Calls against `url` fail with a transport error.
    pub fn unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    /// Sleep this long in every call, to widen race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Names of the delegate methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn published(&self) -> Vec<PublishCall> {
        self.published.lock().unwrap().clone()
    }

    fn enter(&self, method: &str, server: &Server) -> Result<()> {
        self.calls.lock().unwrap().push(method.to_string());
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if self.unreachable.contains(server.url()) {
            return Err(RestError::Transport {
                url: server.url().to_string(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

impl RestDelegate for MockRestDelegate {
    fn repositories(&self, server: &Server) -> Result<Vec<Repository>> {
        self.enter("repositories", server)?;
        Ok(self
            .repositories
            .get(server.url())
            .into_iter()
            .flatten()
            .map(|name| Repository::new(name.clone(), server.clone()))
            .collect())
    }

    fn workspaces(&self, repository: &Repository) -> Result<Vec<Workspace>> {
        self.enter("workspaces", repository.server())?;
        Ok(self
            .workspaces
            .get(repository.name())
            .into_iter()
            .flatten()
            .map(|name| Workspace::new(name.clone(), repository.clone()))
            .collect())
    }

    fn publish(
        &self,
        workspace: &Workspace,
        path: &str,
        file: &Path,
        versionable: bool,
    ) -> Result<Status> {
        self.enter("publish", workspace.server())?;
        self.published.lock().unwrap().push(PublishCall {
            workspace: workspace.name().to_string(),
            path: path.to_string(),
            file: file.to_path_buf(),
            versionable: Some(versionable),
        });
        Ok(Status::ok(format!("published {}", file.display())))
    }

    fn unpublish(&self, workspace: &Workspace, path: &str, file: &Path) -> Result<Status> {
        self.enter("unpublish", workspace.server())?;
        self.published.lock().unwrap().push(PublishCall {
            workspace: workspace.name().to_string(),
            path: path.to_string(),
            file: file.to_path_buf(),
            versionable: None,
        });
        Ok(Status::ok(format!("unpublished {}", file.display())))
    }

    fn query(
        &self,
        workspace: &Workspace,
        language: &str,
        statement: &str,
    ) -> Result<Vec<QueryRow>> {
        self.enter("query", workspace.server())?;
        let mut row = QueryRow::new();
        row.insert("language".to_string(), language.to_string());
        row.insert("statement".to_string(), statement.to_string());
        Ok(vec![row])
    }

    fn file_url(&self, file: &Path, path: &str, workspace: &Workspace) -> Result<Url> {
        self.enter("file_url", workspace.server())?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let raw = format!(
            "{}/{}/{}/items/{}/{}",
            workspace.server().url().trim_end_matches('/'),
            workspace.repository().name(),
            workspace.name(),
            path.trim_matches('/'),
            name
        );
        Url::parse(&raw).map_err(|e| RestError::InvalidUrl {
            url: raw.clone(),
            message: e.to_string(),
        })
    }
}
