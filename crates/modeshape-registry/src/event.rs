//! Registry change events and the listeners that receive them

use std::sync::mpsc;
use std::sync::Arc;

use modeshape_rest::Server;

/// What happened to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerChange {
    Added(Server),
    Removed(Server),
    Updated { old: Server, new: Server },
}

/// Coarse event type, for listeners that only dispatch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    New,
    Remove,
    Update,
}

/// A change to the registry plus the registry state right after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEvent {
    change: ServerChange,
    servers_exist: bool,
}

impl RegistryEvent {
    pub fn new(change: ServerChange, servers_exist: bool) -> Self {
        Self {
            change,
            servers_exist,
        }
    }

    pub fn change(&self) -> &ServerChange {
        &self.change
    }

    pub fn kind(&self) -> EventKind {
        match self.change {
            ServerChange::Added(_) => EventKind::New,
            ServerChange::Removed(_) => EventKind::Remove,
            ServerChange::Updated { .. } => EventKind::Update,
        }
    }

    /// The affected server; for updates, the one that was replaced.
    pub fn server(&self) -> &Server {
        match &self.change {
            ServerChange::Added(server) | ServerChange::Removed(server) => server,
            ServerChange::Updated { old, .. } => old,
        }
    }

    /// The replacement server of an update.
    pub fn updated_server(&self) -> Option<&Server> {
        match &self.change {
            ServerChange::Updated { new, .. } => Some(new),
            _ => None,
        }
    }

    /// Whether at least one server is registered after this change.
    ///
    /// Menu and action state that depends on "any server known" should
    /// follow this flag.
    pub fn servers_exist(&self) -> bool {
        self.servers_exist
    }
}

/// Failure reported by a listener while handling an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Receives registry changes.
///
/// Called synchronously on the thread that changed the registry, after the
/// server lock has been released. A failing (or panicking) listener does not
/// affect other listeners or undo the change.
pub trait RegistryListener: Send + Sync {
    fn server_registry_changed(&self, event: &RegistryEvent) -> Result<(), ListenerError>;
}

impl<F> RegistryListener for F
where
    F: Fn(&RegistryEvent) -> Result<(), ListenerError> + Send + Sync,
{
    fn server_registry_changed(&self, event: &RegistryEvent) -> Result<(), ListenerError> {
        self(event)
    }
}

/// Forwards every event into an mpsc channel.
pub struct ChannelListener {
    sender: mpsc::Sender<RegistryEvent>,
}

impl ChannelListener {
    /// Create a listener together with the receiving end of its channel.
    pub fn channel() -> (Arc<Self>, mpsc::Receiver<RegistryEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Arc::new(Self { sender }), receiver)
    }
}

impl RegistryListener for ChannelListener {
    fn server_registry_changed(&self, event: &RegistryEvent) -> Result<(), ListenerError> {
        self.sender
            .send(event.clone())
            .map_err(|_| ListenerError::new("event receiver was dropped"))
    }
}
