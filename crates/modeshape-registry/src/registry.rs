//! The server registry

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use modeshape_fs::{RobustnessConfig, io};
use modeshape_rest::{QueryRow, Repository, RestDelegate, Server, Status, Workspace};
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::RegistryConfig;
use crate::event::{ListenerError, RegistryEvent, RegistryListener, ServerChange};
use crate::{RegistryError, Result, persistence};

/// File name of the registry document inside the state directory.
pub const DEFAULT_STATE_FILE: &str = "serverRegistry.xml";

/// Thread-safe registry of ModeShape servers.
///
/// Servers are keyed by (URL, user); at most one server per key is
/// registered. Reads take the read lock, mutations the write lock, and
/// [`update_server`](Self::update_server) holds the write lock across its
/// remove-then-add so readers never see the gap.
///
/// Listeners run on the mutating thread after the lock is released. With
/// several threads mutating at once, listeners may see events in a
/// different order than the mutations happened.
pub struct ServerRegistry {
    servers: RwLock<Vec<Server>>,
    listeners: RwLock<Vec<Arc<dyn RegistryListener>>>,
    delegate: Arc<dyn RestDelegate>,
    state_location: Option<PathBuf>,
    state_file: String,
    robustness: RobustnessConfig,
}

impl ServerRegistry {
    /// Create an empty registry without persistence.
    pub fn new(delegate: Arc<dyn RestDelegate>) -> Self {
        Self {
            servers: RwLock::new(Vec::new()),
            listeners: RwLock::new(Vec::new()),
            delegate,
            state_location: None,
            state_file: DEFAULT_STATE_FILE.to_string(),
            robustness: RobustnessConfig::default(),
        }
    }

    /// Create a registry persisting where `config` says.
    pub fn from_config(config: &RegistryConfig, delegate: Arc<dyn RestDelegate>) -> Self {
        let mut registry = Self::new(delegate).with_robustness(config.robustness());
        registry.state_file = config.state_file.clone();
        registry.state_location = config.resolved_state_dir();
        registry
    }

    /// Persist state to `dir`/[`DEFAULT_STATE_FILE`].
    pub fn with_state_location(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_location = Some(dir.into());
        self
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    /// Full path of the state file, if a state location is configured.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.state_location
            .as_ref()
            .map(|dir| dir.join(&self.state_file))
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Snapshot of the registered servers in registration order.
    pub fn servers(&self) -> Vec<Server> {
        self.servers.read().clone()
    }

    pub fn find_server(&self, url: &str, user: &str) -> Option<Server> {
        self.servers
            .read()
            .iter()
            .find(|s| s.matches(url, user))
            .cloned()
    }

    /// True when a server with the same (URL, user) key is registered.
    pub fn is_registered(&self, server: &Server) -> bool {
        self.servers.read().iter().any(|s| s.has_same_key(server))
    }

    /// Whether at least one server is registered.
    pub fn has_servers(&self) -> bool {
        !self.servers.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.servers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.read().is_empty()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Register `server`.
    ///
    /// Fails with [`RegistryError::ServerExists`] when its key is taken.
    /// A warning status means the server was added but some listeners
    /// failed.
    pub fn add_server(&self, server: Server) -> Result<Status> {
        let first = {
            let mut servers = self.servers.write();
            insert(&mut servers, server.clone())?;
            servers.len() == 1
        };

        info!(server = %server, "server added");
        if first {
            debug!("registry now has servers");
        }

        let event = RegistryEvent::new(ServerChange::Added(server.clone()), true);
        Ok(self.notify(&event, format!("Added server {}", server)))
    }

    /// Unregister the server with the same key as `server`.
    pub fn remove_server(&self, server: &Server) -> Result<Status> {
        let (removed, servers_exist) = {
            let mut servers = self.servers.write();
            let removed = take(&mut servers, server)?;
            (removed, !servers.is_empty())
        };

        info!(server = %removed, "server removed");
        if !servers_exist {
            debug!("registry is now empty");
        }

        let message = format!("Removed server {}", removed);
        let event = RegistryEvent::new(ServerChange::Removed(removed), servers_exist);
        Ok(self.notify(&event, message))
    }

    /// Replace `old` with `new` under one write-lock hold and fire a single
    /// update event.
    ///
    /// If `old` is not registered nothing changes. If `new` collides with
    /// another registered server, `old` stays removed and the error is
    /// [`RegistryError::UpdateIncomplete`]; listeners get a remove event for
    /// `old` in that case.
    pub fn update_server(&self, old: &Server, new: Server) -> Result<Status> {
        let outcome = {
            let mut servers = self.servers.write();
            let removed = take(&mut servers, old)?;
            match insert(&mut servers, new.clone()) {
                Ok(()) => Ok(removed),
                Err(e) => Err((removed, e, !servers.is_empty())),
            }
        };

        match outcome {
            Ok(removed) => {
                info!(old = %removed, new = %new, "server updated");
                let message = format!("Updated server {} to {}", removed, new);
                let event = RegistryEvent::new(ServerChange::Updated { old: removed, new }, true);
                Ok(self.notify(&event, message))
            }
            Err((removed, source, servers_exist)) => {
                warn!(
                    old = %removed,
                    new = %new,
                    error = %source,
                    "update removed server but could not add replacement"
                );
                let event =
                    RegistryEvent::new(ServerChange::Removed(removed.clone()), servers_exist);
                self.notify(&event, String::new());
                Err(RegistryError::UpdateIncomplete {
                    removed: removed.to_string(),
                    source: Box::new(source),
                })
            }
        }
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Register `listener` and replay a new-server event for every server
    /// already registered. Registering the same listener twice is a no-op.
    pub fn add_listener(&self, listener: Arc<dyn RegistryListener>) -> Status {
        {
            let mut listeners = self.listeners.write();
            if listeners.iter().any(|l| same_listener(l, &listener)) {
                return Status::ok("Listener already registered");
            }
            listeners.push(Arc::clone(&listener));
        }

        let failures: Vec<String> = self
            .servers()
            .into_iter()
            .filter_map(|server| {
                let event = RegistryEvent::new(ServerChange::Added(server), true);
                invoke(listener.as_ref(), &event).err()
            })
            .map(|e| e.to_string())
            .collect();

        report("Listener registered".to_string(), failures)
    }

    /// Returns whether the listener was registered.
    pub fn remove_listener(&self, listener: &Arc<dyn RegistryListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| !same_listener(l, listener));
        listeners.len() != before
    }

    fn notify(&self, event: &RegistryEvent, message: String) -> Status {
        let listeners = self.listeners.read().clone();

        let failures: Vec<String> = listeners
            .iter()
            .filter_map(|listener| invoke(listener.as_ref(), event).err())
            .map(|e| {
                warn!(
                    kind = ?event.kind(),
                    server = %event.server(),
                    error = %e,
                    "registry listener failed"
                );
                e.to_string()
            })
            .collect();

        report(message, failures)
    }

    // ------------------------------------------------------------------
    // Network
    // ------------------------------------------------------------------

    /// Check that `server` answers, whether or not it is registered.
    pub fn ping(&self, server: &Server) -> Result<Status> {
        self.delegate.repositories(server)?;
        Ok(Status::ok(format!("Connected to {}", server)))
    }

    pub fn repositories(&self, server: &Server) -> Result<Vec<Repository>> {
        self.ensure_registered(server)?;
        Ok(self.delegate.repositories(server)?)
    }

    pub fn workspaces(&self, repository: &Repository) -> Result<Vec<Workspace>> {
        self.ensure_registered(repository.server())?;
        Ok(self.delegate.workspaces(repository)?)
    }

    pub fn publish(
        &self,
        workspace: &Workspace,
        path: &str,
        file: &Path,
        versionable: bool,
    ) -> Result<Status> {
        self.ensure_registered(workspace.server())?;
        Ok(self.delegate.publish(workspace, path, file, versionable)?)
    }

    pub fn unpublish(&self, workspace: &Workspace, path: &str, file: &Path) -> Result<Status> {
        self.ensure_registered(workspace.server())?;
        Ok(self.delegate.unpublish(workspace, path, file)?)
    }

    pub fn query(
        &self,
        workspace: &Workspace,
        language: &str,
        statement: &str,
    ) -> Result<Vec<QueryRow>> {
        self.ensure_registered(workspace.server())?;
        Ok(self.delegate.query(workspace, language, statement)?)
    }

    pub fn file_url(&self, file: &Path, path: &str, workspace: &Workspace) -> Result<Url> {
        self.ensure_registered(workspace.server())?;
        Ok(self.delegate.file_url(file, path, workspace)?)
    }

    /// The read lock is released before the caller goes to the network.
    fn ensure_registered(&self, server: &Server) -> Result<()> {
        if self.is_registered(server) {
            Ok(())
        } else {
            Err(RegistryError::NotRegistered {
                server: server.to_string(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Load servers from the state file and add each of them.
    ///
    /// A missing state location or file is not an error. Entries that are
    /// skipped or collide with registered servers turn the status into a
    /// warning.
    pub fn restore_state(&self) -> Result<Status> {
        let Some(path) = self.state_path() else {
            return Ok(Status::ok("No state location configured"));
        };
        if !path.exists() {
            debug!(path = %path.display(), "no registry file to restore");
            return Ok(Status::ok("No saved servers"));
        }

        let xml = io::read_text(&path)?;
        let decoded = persistence::decode(&xml, &path)?;

        let mut problems = decoded.skipped;
        for entry in &problems {
            warn!(path = %path.display(), "{}", entry);
        }

        let mut restored = 0;
        for server in decoded.servers {
            match self.add_server(server) {
                Ok(status) => {
                    restored += 1;
                    problems.extend(status.details().iter().cloned());
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not restore server");
                    problems.push(e.to_string());
                }
            }
        }

        info!(path = %path.display(), restored, "registry restored");
        Ok(report(
            format!("Restored {} servers from {}", restored, path.display()),
            problems,
        ))
    }

    /// Write all servers to the state file, or delete the file when the
    /// registry is empty.
    pub fn save_state(&self) -> Result<Status> {
        let Some(path) = self.state_path() else {
            return Ok(Status::ok("No state location configured"));
        };

        let servers = self.servers();
        if servers.is_empty() {
            let removed = io::remove_file(&path, self.robustness)?;
            if removed {
                info!(path = %path.display(), "registry empty, removed state file");
            }
            return Ok(Status::ok("No servers to save"));
        }

        let xml = persistence::encode(&servers, &path)?;
        io::write_atomic(&path, xml.as_bytes(), self.robustness)?;

        info!(path = %path.display(), count = servers.len(), "registry saved");
        Ok(Status::ok(format!(
            "Saved {} servers to {}",
            servers.len(),
            path.display()
        )))
    }
}

fn insert(servers: &mut Vec<Server>, server: Server) -> Result<()> {
    if servers.iter().any(|s| s.has_same_key(&server)) {
        return Err(RegistryError::ServerExists {
            server: server.to_string(),
        });
    }
    servers.push(server);
    Ok(())
}

fn take(servers: &mut Vec<Server>, server: &Server) -> Result<Server> {
    let index = servers
        .iter()
        .position(|s| s.has_same_key(server))
        .ok_or_else(|| RegistryError::ServerNotFound {
            server: server.to_string(),
        })?;
    Ok(servers.remove(index))
}

/// Call one listener, turning a panic into an error.
fn invoke(
    listener: &dyn RegistryListener,
    event: &RegistryEvent,
) -> std::result::Result<(), ListenerError> {
    match panic::catch_unwind(AssertUnwindSafe(|| listener.server_registry_changed(event))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ListenerError::new(format!("listener panicked: {}", reason)))
        }
    }
}

/// Compare listeners by the object they point to, ignoring vtables.
fn same_listener(a: &Arc<dyn RegistryListener>, b: &Arc<dyn RegistryListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

fn report(message: String, failures: Vec<String>) -> Status {
    if failures.is_empty() {
        Status::ok(message)
    } else {
        Status::warning(message).with_details(failures)
    }
}
