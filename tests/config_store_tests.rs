// Configuration store behaviour under concurrent use

use gitkeeper::{ConfigStore, Credentials, RepositoryRecord};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

#[test]
fn test_concurrent_adds_are_not_lost() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ConfigStore::new(dir.path().join("conf.toml")));
    let workers = 16;
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.add_repository(&RepositoryRecord::new(format!("repo-{i}"), format!("/src/repo-{i}")));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let names: HashSet<String> = store.list_repositories().into_iter().map(|r| r.name).collect();
    assert_eq!(names.len(), workers);
    for i in 0..workers {
        assert!(names.contains(&format!("repo-{i}")), "repo-{i} was lost");
    }
}

#[test]
fn test_readers_and_writers_interleave_safely() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ConfigStore::new(dir.path().join("conf.toml")));
    store.save_credentials(&Credentials::new("alice", None, "git.example.org", 22));

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for i in 0..20 {
                store.add_repository(&RepositoryRecord::new(format!("r{i}"), "/tmp"));
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for _ in 0..20 {
                    // Never observes a half-written document
                    assert_eq!(store.get_last_credentials().login, "alice");
                    let _ = store.list_repositories();
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.list_repositories().len(), 20);
}

#[test]
fn test_add_then_delete_then_list() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::new(dir.path().join("conf.toml"));
    let record = RepositoryRecord::new("docs", "/src/docs");

    store.add_repository(&record);
    store.delete_repositories(&HashSet::from([record.name.clone()]));
    assert!(!store.list_repositories().contains(&record));

    // Deleting again is a no-op
    store.delete_repositories(&HashSet::from([record.name.clone()]));
    assert!(store.list_repositories().is_empty());
}

#[test]
fn test_state_survives_a_new_store_instance() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.toml");
    let credentials = Credentials::new("bob", Some("pw".to_string()), "example.org", 65535);

    {
        let store = ConfigStore::new(&path);
        store.save_credentials(&credentials);
        store.add_repository(&RepositoryRecord::new("web", "/src/web"));
    }

    let reopened = ConfigStore::new(&path);
    assert_eq!(reopened.get_last_credentials(), credentials.without_password());
    assert_eq!(reopened.list_repositories(), vec![RepositoryRecord::new("web", "/src/web")]);
}

#[test]
fn test_document_layout_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.toml");
    let store = ConfigStore::new(&path);

    store.save_credentials(&Credentials::new("carol", Some("secret".to_string()), "host.local", 2200));
    store.add_repository(&RepositoryRecord::new("infra", "/src/infra"));

    let value: toml::Value = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let table = value.as_table().unwrap();
    let mut sections: Vec<&String> = table.keys().collect();
    sections.sort();
    assert_eq!(sections, vec!["repos", "user"]);
    assert_eq!(value["user"]["login"].as_str(), Some("carol"));
    assert_eq!(value["user"]["port"].as_integer(), Some(2200));
    assert!(value["user"].get("password").is_none());
    assert_eq!(value["repos"]["infra"].as_str(), Some("/src/infra"));

    // No temporary files are left behind
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
