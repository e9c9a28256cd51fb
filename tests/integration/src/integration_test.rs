//! End-to-end test for configuration, registry and persistence
//!
//! This test exercises the complete flow: config loading -> registry
//! construction -> mutations -> save -> restore in a fresh registry.

use std::fs;
use std::sync::Arc;

use modeshape_registry::{
    ChannelListener, EventKind, RegistryConfig, RegistryError, Server, ServerRegistry,
};
use modeshape_test_utils::{MockRestDelegate, server};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Write a YAML config pointing the registry at `<temp>/state/servers.xml`
fn setup_config() -> (TempDir, RegistryConfig) {
    let temp = TempDir::new().unwrap();
    let state_dir = temp.path().join("state");
    let config_path = temp.path().join("msreg.yaml");
    fs::write(
        &config_path,
        format!(
            "state_dir: {}\nstate_file: servers.xml\nlock_timeout_ms: 1000\nrest:\n  timeout_secs: 5\n",
            state_dir.display()
        ),
    )
    .unwrap();

    let config = RegistryConfig::load(&config_path).unwrap();
    (temp, config)
}

#[test]
fn test_config_drives_state_location() {
    let (temp, config) = setup_config();
    assert_eq!(config.state_file, "servers.xml");
    assert_eq!(config.rest.timeout_secs, 5);

    let registry = ServerRegistry::from_config(&config, Arc::new(MockRestDelegate::new()));
    registry.add_server(server("http://h:8080/rest", "admin")).unwrap();
    registry.save_state().unwrap();

    assert!(temp.path().join("state").join("servers.xml").exists());
}

#[test]
fn test_full_session_survives_restart() {
    let (_temp, config) = setup_config();

    // First session
    {
        let registry = ServerRegistry::from_config(&config, Arc::new(MockRestDelegate::new()));
        assert!(registry.restore_state().unwrap().is_ok());
        assert!(registry.is_empty());

        registry
            .add_server(Server::new("http://a:8080/rest", "admin", Some("pw".into()), true))
            .unwrap();
        registry
            .add_server(Server::new("http://b:9090/rest", "guest", Some("tmp".into()), false))
            .unwrap();
        let old = server("http://c:8080/rest", "old");
        registry.add_server(old.clone()).unwrap();
        registry
            .update_server(&old, server("http://c:8080/rest", "new"))
            .unwrap();
        registry.save_state().unwrap();
    }

    // Second session
    let registry = ServerRegistry::from_config(&config, Arc::new(MockRestDelegate::new()));
    let (listener, events) = ChannelListener::channel();
    registry.add_listener(listener);
    registry.restore_state().unwrap();

    let keys: Vec<(String, String)> = registry
        .servers()
        .iter()
        .map(|s| (s.url().to_string(), s.user().to_string()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("http://a:8080/rest".to_string(), "admin".to_string()),
            ("http://b:9090/rest".to_string(), "guest".to_string()),
            ("http://c:8080/rest".to_string(), "new".to_string()),
        ]
    );
    assert_eq!(
        registry.find_server("http://a:8080/rest", "admin").unwrap().password(),
        Some("pw")
    );
    assert_eq!(
        registry.find_server("http://b:9090/rest", "guest").unwrap().password(),
        None
    );

    // Restoring announces each server to existing listeners
    let kinds: Vec<EventKind> = events.try_iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![EventKind::New; 3]);
}

#[test]
fn test_restore_twice_reports_duplicates() {
    let (_temp, config) = setup_config();
    let registry = ServerRegistry::from_config(&config, Arc::new(MockRestDelegate::new()));
    registry.add_server(server("http://h:8080/rest", "admin")).unwrap();
    registry.save_state().unwrap();

    let status = registry.restore_state().unwrap();

    assert!(status.is_warning());
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_unwritable_state_location_is_an_error() {
    let temp = TempDir::new().unwrap();
    // A regular file where the state directory should be
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let registry =
        ServerRegistry::new(Arc::new(MockRestDelegate::new())).with_state_location(&blocker);
    registry.add_server(server("http://h:8080/rest", "admin")).unwrap();

    assert!(matches!(registry.save_state(), Err(RegistryError::Fs(_))));
}
