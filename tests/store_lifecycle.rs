//! End-to-end lifecycle of the session store: folders, saves, restarts,
//! tagging, backup, and restore — everything a desktop shell drives across
//! application runs.

use agentdeck_sessions::{LoadStrategy, SessionItem, SessionManager, StoreConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn manager_at(dir: &Path) -> SessionManager {
    SessionManager::new(StoreConfig::at(dir)).unwrap()
}

#[test]
fn full_lifecycle_with_backup_and_restore() {
    let store = TempDir::new().unwrap();
    let backups = TempDir::new().unwrap();
    let archive = backups.path().join("agentdeck-backup.tar.gz");

    // Create a folder and a tagged session.
    let mut manager = manager_at(store.path());
    let folder_id = manager.create_folder("Research", None).unwrap();
    let session = SessionItem::new(
        "T1",
        "compare embedding models",
        "MiniLM wins on latency...",
        "research",
        vec!["a".into(), "b".into()],
    );
    let session_id = manager.save_session(session).unwrap();

    // Simulated restart: a fresh manager sees identical fields.
    let mut manager = manager_at(store.path());
    {
        let loaded = manager.model().get_session(&session_id).unwrap();
        assert_eq!(loaded.title, "T1");
        assert_eq!(loaded.prompt, "compare embedding models");
        assert_eq!(loaded.response, "MiniLM wins on latency...");
        assert_eq!(loaded.flow_type, "research");
        assert_eq!(loaded.tags, vec!["a", "b"]);
        assert!(!loaded.favorite);
        assert!(manager.model().get_folder(&folder_id).is_some());
    }

    // Tag it, back the store up, then delete the session.
    assert!(manager.add_tag_to_session(&session_id, "c").unwrap());
    assert_eq!(
        manager.model().get_session(&session_id).unwrap().tags,
        vec!["a", "b", "c"]
    );
    manager.backup_sessions(&archive).unwrap();
    assert!(manager.delete_session(&session_id).unwrap());
    assert!(manager.model().get_session(&session_id).is_none());

    // Restore brings the session back, tags intact.
    assert!(manager.restore_sessions(&archive).unwrap());
    let restored = manager.model().get_session(&session_id).unwrap();
    assert_eq!(restored.title, "T1");
    assert_eq!(restored.tags, vec!["a", "b", "c"]);
    assert!(manager.model().get_folder(&folder_id).is_some());
}

#[test]
fn restore_refuses_archive_without_index() {
    let store = TempDir::new().unwrap();
    let mut manager = manager_at(store.path());
    let session_id = manager
        .save_session(SessionItem::new("keep me", "p", "r", "chat", vec![]))
        .unwrap();

    // An archive of a directory that is not a session store.
    let junk = TempDir::new().unwrap();
    fs::write(junk.path().join("notes.txt"), "not a store").unwrap();
    let backups = TempDir::new().unwrap();
    let archive = backups.path().join("bad.tar.gz");
    agentdeck_sessions::session::backup::create_archive(junk.path(), &archive).unwrap();

    assert!(!manager.restore_sessions(&archive).unwrap());
    // The existing store was never touched.
    assert!(manager.model().get_session(&session_id).is_some());
    assert!(store.path().join("index.json").exists());
}

#[test]
fn lazy_and_eager_stores_agree_on_metadata() {
    let store = TempDir::new().unwrap();
    let ids: Vec<String> = {
        let mut manager = manager_at(store.path());
        (0..3)
            .map(|i| {
                let mut session = SessionItem::new(
                    format!("session {i}"),
                    format!("prompt {i}"),
                    format!("response {i}"),
                    "chat",
                    vec![format!("tag{i}")],
                );
                session.favorite = i == 1;
                manager.save_session(session).unwrap()
            })
            .collect()
    };

    let mut lazy =
        SessionManager::new(StoreConfig::at(store.path()).with_strategy(LoadStrategy::Lazy))
            .unwrap();
    let eager = manager_at(store.path());

    assert_eq!(lazy.model().session_count(), eager.model().session_count());
    assert_eq!(lazy.get_all_tags(), eager.get_all_tags());
    assert_eq!(
        lazy.get_favorite_sessions().len(),
        eager.get_favorite_sessions().len()
    );
    // Title search needs no content; both modes find it.
    assert_eq!(lazy.search_sessions("session 2", &[]).len(), 1);
    assert_eq!(eager.search_sessions("session 2", &[]).len(), 1);

    // Content appears only after hydration in the lazy store.
    assert_eq!(lazy.model().get_session(&ids[0]).unwrap().prompt, "");
    let hydrated = lazy.load_session_content(&ids[0]).unwrap().unwrap();
    assert_eq!(hydrated.prompt, "prompt 0");
}

#[test]
fn recency_ranking_survives_restart() {
    let store = TempDir::new().unwrap();
    {
        let mut manager = manager_at(store.path());
        for title in ["first", "second", "third"] {
            manager
                .save_session(SessionItem::new(title, "p", "r", "chat", vec![]))
                .unwrap();
        }
        // Touch "first" so it becomes the most recent.
        let id = manager
            .model()
            .get_all_sessions()
            .iter()
            .find(|s| s.title == "first")
            .map(|s| s.id.clone())
            .unwrap();
        let session = manager.model().get_session(&id).unwrap().clone();
        manager.save_session(session).unwrap();
    }

    let manager = manager_at(store.path());
    let recent = manager.get_recent_sessions(2);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].title, "first");
}
