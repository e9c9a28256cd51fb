//! Publishing workflows across the registry, delegates and listeners

use std::path::Path;
use std::sync::{Arc, Mutex, Weak};

use modeshape_registry::{
    HttpConfig, HttpRestDelegate, ListenerError, RegistryError, RegistryEvent, RegistryListener,
    Repository, Server, ServerChange, ServerRegistry, Workspace,
};
use modeshape_rest::RestError;
use modeshape_test_utils::{MockRestDelegate, TestStateDir, server};
use pretty_assertions::assert_eq;

const URL: &str = "http://localhost:8080/modeshape-rest";

/// Keeps a sorted list of server labels in sync with the registry, the
/// way a server browser view would.
#[derive(Default)]
struct ServerView {
    rows: Mutex<Vec<String>>,
}

impl ServerView {
    fn rows(&self) -> Vec<String> {
        self.rows.lock().unwrap().clone()
    }
}

impl RegistryListener for ServerView {
    fn server_registry_changed(&self, event: &RegistryEvent) -> Result<(), ListenerError> {
        let mut rows = self.rows.lock().unwrap();
        match event.change() {
            ServerChange::Added(server) => rows.push(server.to_string()),
            ServerChange::Removed(server) => rows.retain(|r| *r != server.to_string()),
            ServerChange::Updated { old, new } => {
                rows.retain(|r| *r != old.to_string());
                rows.push(new.to_string());
            }
        }
        rows.sort();
        Ok(())
    }
}

#[test]
fn test_browse_and_publish_workflow() {
    let state = TestStateDir::new();
    let delegate = Arc::new(
        MockRestDelegate::new()
            .with_repositories(URL, &["sample", "cars"])
            .with_workspaces("cars", &["default", "staging"]),
    );
    let registry = ServerRegistry::new(delegate.clone()).with_state_location(state.root());
    let view = Arc::new(ServerView::default());
    registry.add_listener(view.clone());

    let admin = Server::new(URL, "admin", Some("secret".into()), true);
    assert!(registry.ping(&admin).unwrap().is_ok());
    registry.add_server(admin.clone()).unwrap();
    assert_eq!(view.rows(), vec![format!("admin@{URL}")]);

    let repositories = registry.repositories(&admin).unwrap();
    let cars = repositories
        .iter()
        .find(|r| r.name() == "cars")
        .cloned()
        .unwrap();
    let workspaces = registry.workspaces(&cars).unwrap();
    let staging = workspaces.iter().find(|w| w.name() == "staging").unwrap();

    let file = Path::new("/project/cnd/cars.cnd");
    registry.publish(staging, "/types", file, true).unwrap();
    let url = registry.file_url(file, "/types", staging).unwrap();
    assert_eq!(
        url.as_str(),
        format!("{URL}/cars/staging/items/types/cars.cnd")
    );
    registry.unpublish(staging, "/types", file).unwrap();

    assert_eq!(
        delegate.calls(),
        vec![
            "repositories",
            "repositories",
            "workspaces",
            "publish",
            "file_url",
            "unpublish"
        ]
    );

    registry.save_state().unwrap();
    assert!(state.read_state().contains("password="));
}

#[test]
fn test_removing_server_cuts_off_browsing() {
    let delegate = Arc::new(MockRestDelegate::new().with_repositories(URL, &["sample"]));
    let registry = ServerRegistry::new(delegate.clone());
    let admin = server(URL, "admin");
    registry.add_server(admin.clone()).unwrap();
    let workspace = Workspace::new("default", Repository::new("sample", admin.clone()));

    registry.remove_server(&admin).unwrap();

    assert!(matches!(
        registry.repositories(&admin),
        Err(RegistryError::NotRegistered { .. })
    ));
    assert!(matches!(
        registry.query(&workspace, "JCR-SQL2", "SELECT * FROM [nt:base]"),
        Err(RegistryError::NotRegistered { .. })
    ));
    assert!(delegate.calls().is_empty());
}

#[test]
fn test_view_follows_update_and_failed_update() {
    let registry = ServerRegistry::new(Arc::new(MockRestDelegate::new()));
    let view = Arc::new(ServerView::default());
    registry.add_listener(view.clone());

    registry.add_server(server(URL, "a")).unwrap();
    registry.add_server(server(URL, "b")).unwrap();
    registry.update_server(&server(URL, "a"), server(URL, "c")).unwrap();
    assert_eq!(view.rows(), vec![format!("b@{URL}"), format!("c@{URL}")]);

    // c -> b collides with b; c is dropped and the view must follow
    let result = registry.update_server(&server(URL, "c"), server(URL, "b"));
    assert!(matches!(result, Err(RegistryError::UpdateIncomplete { .. })));
    assert_eq!(view.rows(), vec![format!("b@{URL}")]);
    assert_eq!(registry.len(), 1);
}

/// Reacts to new servers by listing their repositories.
struct AutoBrowser {
    registry: Weak<ServerRegistry>,
    seen: Mutex<Vec<String>>,
}

impl RegistryListener for AutoBrowser {
    fn server_registry_changed(&self, event: &RegistryEvent) -> Result<(), ListenerError> {
        let ServerChange::Added(server) = event.change() else {
            return Ok(());
        };
        let Some(registry) = self.registry.upgrade() else {
            return Ok(());
        };
        let repositories = registry
            .repositories(server)
            .map_err(|e| ListenerError::new(e.to_string()))?;
        self.seen
            .lock()
            .unwrap()
            .extend(repositories.iter().map(|r| r.name().to_string()));
        Ok(())
    }
}

#[test]
fn test_listener_can_call_back_into_registry() {
    let registry = Arc::new(ServerRegistry::new(Arc::new(
        MockRestDelegate::new().with_repositories(URL, &["sample"]),
    )));
    let browser = Arc::new(AutoBrowser {
        registry: Arc::downgrade(&registry),
        seen: Mutex::new(Vec::new()),
    });
    registry.add_listener(browser.clone());

    let status = registry.add_server(server(URL, "admin")).unwrap();

    assert!(status.is_ok());
    assert_eq!(*browser.seen.lock().unwrap(), vec!["sample"]);
}

#[test]
fn test_http_delegate_reports_unreachable_server() {
    let delegate = HttpRestDelegate::new(HttpConfig {
        timeout: std::time::Duration::from_secs(2),
        ..HttpConfig::default()
    });
    let registry = ServerRegistry::new(Arc::new(delegate));
    let dead = server("http://127.0.0.1:9/modeshape-rest", "admin");
    registry.add_server(dead.clone()).unwrap();

    let result = registry.repositories(&dead);

    assert!(matches!(
        result,
        Err(RegistryError::Rest(RestError::Transport { .. }))
    ));
}
