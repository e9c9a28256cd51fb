//! Concurrent access to a shared registry

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use modeshape_registry::{RegistryError, ServerRegistry};
use modeshape_test_utils::{MockRestDelegate, TestStateDir, server};

const URL: &str = "http://h:8080/x";

fn shared_registry() -> Arc<ServerRegistry> {
    Arc::new(ServerRegistry::new(Arc::new(MockRestDelegate::new())))
}

#[test]
fn test_concurrent_adds_all_land() {
    let registry = shared_registry();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..25 {
                    registry
                        .add_server(server(URL, &format!("user-{t}-{i}")))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 200);
}

#[test]
fn test_racing_adds_of_same_key_admit_exactly_one() {
    let registry = shared_registry();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.add_server(server(URL, "admin")).is_ok())
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_readers_never_see_duplicate_keys() {
    let registry = shared_registry();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let registry = Arc::clone(&registry);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..200 {
                let s = server(URL, &format!("u{}", i % 10));
                if registry.add_server(s.clone()).is_err() {
                    registry.remove_server(&s).unwrap();
                }
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let reader = {
        let registry = Arc::clone(&registry);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                let snapshot = registry.servers();
                for (i, a) in snapshot.iter().enumerate() {
                    for b in &snapshot[i + 1..] {
                        assert!(!a.has_same_key(b), "duplicate key in snapshot");
                    }
                }
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
}

#[test]
fn test_update_is_atomic_to_readers() {
    let registry = shared_registry();
    registry.add_server(server(URL, "a")).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let registry = Arc::clone(&registry);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..500 {
                let (from, to) = if i % 2 == 0 { ("a", "b") } else { ("b", "a") };
                registry
                    .update_server(&server(URL, from), server(URL, to))
                    .unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let reader = {
        let registry = Arc::clone(&registry);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                assert_eq!(registry.len(), 1, "reader saw the update gap");
                assert!(registry.has_servers());
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();
}

#[test]
fn test_network_calls_do_not_block_mutations() {
    let delegate = MockRestDelegate::new()
        .with_repositories(URL, &["sample"])
        .with_delay(Duration::from_millis(200));
    let registry = Arc::new(ServerRegistry::new(Arc::new(delegate)));
    let admin = server(URL, "admin");
    registry.add_server(admin.clone()).unwrap();

    let slow = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || registry.repositories(&admin))
    };
    thread::sleep(Duration::from_millis(50));

    // Would deadlock or wait out the delay if the lock were held
    registry.add_server(server(URL, "other")).unwrap();
    assert_eq!(registry.len(), 2);

    let repos = slow.join().unwrap().unwrap();
    assert_eq!(repos.len(), 1);
}

#[test]
fn test_concurrent_saves_leave_a_readable_file() {
    let state = TestStateDir::new();
    let registry = Arc::new(
        ServerRegistry::new(Arc::new(MockRestDelegate::new())).with_state_location(state.root()),
    );
    for i in 0..5 {
        registry.add_server(server(URL, &format!("u{i}"))).unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.save_state().unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let restored =
        ServerRegistry::new(Arc::new(MockRestDelegate::new())).with_state_location(state.root());
    assert!(restored.restore_state().unwrap().is_ok());
    assert_eq!(restored.len(), 5);
}

#[test]
fn test_remove_race_has_single_winner() {
    let registry = shared_registry();
    registry.add_server(server(URL, "admin")).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.remove_server(&server(URL, "admin")))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, RegistryError::ServerNotFound { .. }))
    );
    assert!(registry.is_empty());
}
