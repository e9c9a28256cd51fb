//! The network seam between the registry and a ModeShape server

use std::path::Path;

use url::Url;

use crate::{QueryRow, Repository, Result, Server, Status, Workspace};

/// Performs the REST calls the registry needs.
///
/// Implementations own all transport concerns (timeouts, retries,
/// authentication). The registry never calls a delegate while holding
/// its server lock.
pub trait RestDelegate: Send + Sync {
    /// Repositories hosted by `server`. Fails on network or auth errors.
    fn repositories(&self, server: &Server) -> Result<Vec<Repository>>;

    /// Workspaces of `repository`.
    fn workspaces(&self, repository: &Repository) -> Result<Vec<Workspace>>;

    /// Upload `file` below `path` in `workspace`.
    ///
    /// With `versionable` the published node is made `mix:versionable`.
    fn publish(
        &self,
        workspace: &Workspace,
        path: &str,
        file: &Path,
        versionable: bool,
    ) -> Result<Status>;

    /// Delete the node previously published for `file` below `path`.
    fn unpublish(&self, workspace: &Workspace, path: &str, file: &Path) -> Result<Status>;

    /// Run a query in `language` (e.g. `jcr-sql2`, `xpath`) against `workspace`.
    fn query(&self, workspace: &Workspace, language: &str, statement: &str)
    -> Result<Vec<QueryRow>>;

    /// The URL under which `file`, published below `path`, is reachable.
    fn file_url(&self, file: &Path, path: &str, workspace: &Workspace) -> Result<Url>;
}
