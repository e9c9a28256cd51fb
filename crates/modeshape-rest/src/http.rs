//! Blocking HTTP implementation of [`RestDelegate`] for the ModeShape REST API

use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::{QueryRow, Repository, RestDelegate, RestError, Result, Server, Status, Workspace};

/// Transport settings for [`HttpRestDelegate`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Overall timeout of one request
    pub timeout: Duration,
    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("msreg/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Deserialize)]
struct NamedEntry {
    name: String,
}

#[derive(Deserialize)]
struct RepositoriesResponse {
    #[serde(default)]
    repositories: Vec<NamedEntry>,
}

#[derive(Deserialize)]
struct WorkspacesResponse {
    #[serde(default)]
    workspaces: Vec<NamedEntry>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    rows: Vec<serde_json::Map<String, Value>>,
}

enum Body<'a> {
    Empty,
    Bytes(&'a [u8]),
    Text(&'a str, &'a str),
}

/// Talks to a ModeShape server over its REST interface.
///
/// Endpoints, relative to the server URL:
/// - `/` lists repositories
/// - `/{repo}` lists workspaces
/// - `/{repo}/{ws}/upload/{path}` accepts raw file content
/// - `/{repo}/{ws}/items/{path}` addresses a node
/// - `/{repo}/{ws}/query` runs a query
pub struct HttpRestDelegate {
    agent: ureq::Agent,
}

impl HttpRestDelegate {
    pub fn new(config: HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }

    fn execute(
        &self,
        server: &Server,
        method: &str,
        url: &Url,
        body: Body<'_>,
    ) -> Result<ureq::Response> {
        debug!(%method, %url, user = server.user(), "ModeShape request");

        let request = self
            .agent
            .request(method, url.as_str())
            .set("Authorization", &basic_auth(server))
            .set("Accept", "application/json");

        let outcome = match body {
            Body::Empty => request.call(),
            Body::Bytes(bytes) => request
                .set("Content-Type", "application/octet-stream")
                .send_bytes(bytes),
            Body::Text(content_type, text) => {
                request.set("Content-Type", content_type).send_string(text)
            }
        };

        match outcome {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(RestError::from_http_status(
                    url.as_str(),
                    server.user(),
                    code,
                    body,
                ))
            }
            Err(ureq::Error::Transport(transport)) => Err(RestError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        }
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, server: &Server, url: &Url) -> Result<T> {
        let response = self.execute(server, "GET", url, Body::Empty)?;
        read_json(url, response)
    }
}

impl Default for HttpRestDelegate {
    fn default() -> Self {
        Self::new(HttpConfig::default())
    }
}

impl RestDelegate for HttpRestDelegate {
    fn repositories(&self, server: &Server) -> Result<Vec<Repository>> {
        let url = endpoint(server.url(), &[])?;
        let listing: RepositoriesResponse = self.get_json(server, &url)?;

        Ok(listing
            .repositories
            .into_iter()
            .map(|entry| Repository::new(entry.name, server.clone()))
            .collect())
    }

    fn workspaces(&self, repository: &Repository) -> Result<Vec<Workspace>> {
        let server = repository.server();
        let url = endpoint(server.url(), &[repository.name()])?;
        let listing: WorkspacesResponse = self.get_json(server, &url)?;

        Ok(listing
            .workspaces
            .into_iter()
            .map(|entry| Workspace::new(entry.name, repository.clone()))
            .collect())
    }

    fn publish(
        &self,
        workspace: &Workspace,
        path: &str,
        file: &Path,
        versionable: bool,
    ) -> Result<Status> {
        let server = workspace.server();
        let content = std::fs::read(file).map_err(|source| RestError::File {
            path: file.to_path_buf(),
            source,
        })?;

        let upload = node_url(workspace, "upload", path, file)?;
        self.execute(server, "POST", &upload, Body::Bytes(&content))?;

        if versionable {
            let item = node_url(workspace, "items", path, file)?;
            let mixin = serde_json::json!({ "jcr:mixinTypes": ["mix:versionable"] }).to_string();
            self.execute(server, "PUT", &item, Body::Text("application/json", &mixin))?;
        }

        info!(file = %file.display(), %workspace, path, versionable, "published");
        Ok(Status::ok(format!(
            "Published {} to {} at {}",
            file.display(),
            workspace,
            path
        )))
    }

    fn unpublish(&self, workspace: &Workspace, path: &str, file: &Path) -> Result<Status> {
        let item = node_url(workspace, "items", path, file)?;

        match self.execute(workspace.server(), "DELETE", &item, Body::Empty) {
            Ok(_) => {
                info!(file = %file.display(), %workspace, path, "unpublished");
                Ok(Status::ok(format!(
                    "Unpublished {} from {} at {}",
                    file.display(),
                    workspace,
                    path
                )))
            }
            Err(RestError::NotFound { .. }) => Ok(Status::warning(format!(
                "{} was not published to {} at {}",
                file.display(),
                workspace,
                path
            ))),
            Err(e) => Err(e),
        }
    }

    fn query(
        &self,
        workspace: &Workspace,
        language: &str,
        statement: &str,
    ) -> Result<Vec<QueryRow>> {
        let repository = workspace.repository();
        let url = endpoint(
            workspace.server().url(),
            &[repository.name(), workspace.name(), "query"],
        )?;
        let content_type = format!("application/jcr+{}", language);

        let response = self.execute(
            workspace.server(),
            "POST",
            &url,
            Body::Text(&content_type, statement),
        )?;
        let result: QueryResponse = read_json(&url, response)?;

        Ok(result.rows.into_iter().map(into_row).collect())
    }

    fn file_url(&self, file: &Path, path: &str, workspace: &Workspace) -> Result<Url> {
        node_url(workspace, "items", path, file)
    }
}

fn basic_auth(server: &Server) -> String {
    let credentials = format!("{}:{}", server.user(), server.password().unwrap_or(""));
    format!("Basic {}", STANDARD.encode(credentials))
}

fn read_json<T: for<'de> Deserialize<'de>>(url: &Url, response: ureq::Response) -> Result<T> {
    let text = response
        .into_string()
        .map_err(|e| RestError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    serde_json::from_str(&text).map_err(|e| RestError::InvalidResponse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn into_row(raw: serde_json::Map<String, Value>) -> QueryRow {
    raw.into_iter()
        .map(|(column, value)| {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (column, text)
        })
        .collect()
}

/// Append `segments` to the server URL, percent-encoding each one.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).map_err(|e| RestError::InvalidUrl {
        url: base.to_string(),
        message: e.to_string(),
    })?;

    url.path_segments_mut()
        .map_err(|_| RestError::InvalidUrl {
            url: base.to_string(),
            message: "URL cannot carry a path".to_string(),
        })?
        .pop_if_empty()
        .extend(segments.iter().filter(|s| !s.is_empty()));

    Ok(url)
}

/// URL of the node for `file` published below `path`.
fn node_url(workspace: &Workspace, area: &str, path: &str, file: &Path) -> Result<Url> {
    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| RestError::File {
            path: file.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;

    let mut segments = vec![workspace.repository().name(), workspace.name(), area];
    segments.extend(path.split('/').filter(|s| !s.is_empty()));
    segments.push(&file_name);

    endpoint(workspace.server().url(), &segments)
}
