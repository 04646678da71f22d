//! In-memory session index — id-keyed session and folder maps with query
//! operations.
//!
//! The model holds no I/O: it is rebuilt wholesale by [`super::manager::SessionManager`]
//! on every load and mutated only through the manager's operations.

use super::types::{now_rfc3339, SessionFolder, SessionItem};
use std::collections::{BTreeSet, HashMap};

/// Names of the folders seeded into an empty store.
pub const DEFAULT_FOLDERS: [&str; 3] = ["Root", "Favorites", "Recent"];

/// Partial update applied by [`SessionsModel::update_session`]. Unset fields
/// are left alone; any applied patch refreshes `updated`.
#[derive(Debug, Clone, Default)]
pub struct SessionPatch {
    pub title: Option<String>,
    /// (prompt, response, flow_type) — content always changes together.
    pub content: Option<(String, String, String)>,
    pub favorite: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Process-lifetime aggregate of all sessions and folders, keyed by id.
#[derive(Debug, Default)]
pub struct SessionsModel {
    sessions: HashMap<String, SessionItem>,
    folders: HashMap<String, SessionFolder>,
}

impl SessionsModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed Root/Favorites/Recent, but only into an empty folder map — a
    /// loaded store keeps the folders it came with.
    pub fn ensure_default_folders(&mut self) {
        if !self.folders.is_empty() {
            return;
        }
        let root = SessionFolder::new(DEFAULT_FOLDERS[0], None);
        let root_id = root.id.clone();
        self.add_folder(root);
        for name in &DEFAULT_FOLDERS[1..] {
            self.add_folder(SessionFolder::new(*name, Some(root_id.clone())));
        }
    }

    // ── Sessions ─────────────────────────────────────────────────

    /// Insert keyed by the session's id. An existing entry with the same id
    /// is silently overwritten.
    pub fn add_session(&mut self, session: SessionItem) -> String {
        let id = session.id.clone();
        self.sessions.insert(id.clone(), session);
        id
    }

    /// Apply a partial update. Returns false when the id is unknown.
    pub fn update_session(&mut self, id: &str, patch: SessionPatch) -> bool {
        let Some(session) = self.sessions.get_mut(id) else {
            return false;
        };
        if let Some(title) = patch.title {
            session.title = title;
        }
        if let Some((prompt, response, flow_type)) = patch.content {
            session.prompt = prompt;
            session.response = response;
            session.flow_type = flow_type;
            session.content_loaded = true;
        }
        if let Some(favorite) = patch.favorite {
            session.favorite = favorite;
        }
        if let Some(tags) = patch.tags {
            session.tags = tags;
        }
        session.updated = now_rfc3339();
        true
    }

    /// Remove a session. Returns false when the id is unknown.
    pub fn delete_session(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn get_session(&self, id: &str) -> Option<&SessionItem> {
        self.sessions.get(id)
    }

    pub fn get_session_mut(&mut self, id: &str) -> Option<&mut SessionItem> {
        self.sessions.get_mut(id)
    }

    pub fn get_all_sessions(&self) -> Vec<&SessionItem> {
        self.sessions.values().collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn get_favorite_sessions(&self) -> Vec<&SessionItem> {
        self.sessions.values().filter(|s| s.favorite).collect()
    }

    /// Most recently updated sessions, most recent first.
    pub fn get_recent_sessions(&self, limit: usize) -> Vec<&SessionItem> {
        let mut sessions: Vec<&SessionItem> = self.sessions.values().collect();
        sessions.sort_by(|a, b| b.updated.cmp(&a.updated));
        sessions.truncate(limit);
        sessions
    }

    pub fn get_sessions_with_tag(&self, tag: &str) -> Vec<&SessionItem> {
        self.sessions
            .values()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Case-insensitive substring search over title, prompt, and response.
    /// When `tags` is non-empty a session must carry every requested tag.
    /// Results are unordered.
    pub fn search_sessions(&self, query: &str, tags: &[String]) -> Vec<&SessionItem> {
        let query = query.to_lowercase();
        self.sessions
            .values()
            .filter(|s| {
                s.title.to_lowercase().contains(&query)
                    || s.prompt.to_lowercase().contains(&query)
                    || s.response.to_lowercase().contains(&query)
            })
            .filter(|s| tags.iter().all(|tag| s.tags.iter().any(|t| t == tag)))
            .collect()
    }

    /// Deduplicated, alphabetically sorted union of every session's tags.
    pub fn get_all_tags(&self) -> Vec<String> {
        let tags: BTreeSet<&str> = self
            .sessions
            .values()
            .flat_map(|s| s.tags.iter().map(String::as_str))
            .collect();
        tags.into_iter().map(String::from).collect()
    }

    // ── Folders ──────────────────────────────────────────────────

    pub fn add_folder(&mut self, folder: SessionFolder) -> String {
        let id = folder.id.clone();
        self.folders.insert(id.clone(), folder);
        id
    }

    /// Rename a folder. Returns false when the id is unknown.
    pub fn update_folder(&mut self, id: &str, name: &str) -> bool {
        let Some(folder) = self.folders.get_mut(id) else {
            return false;
        };
        folder.name = name.to_string();
        true
    }

    /// Remove the folder node only. Child folders and any sessions grouped
    /// under it are left untouched; children keep their now-dangling
    /// `parent_id` and drop out of hierarchy traversal.
    pub fn delete_folder(&mut self, id: &str) -> bool {
        self.folders.remove(id).is_some()
    }

    pub fn get_folder(&self, id: &str) -> Option<&SessionFolder> {
        self.folders.get(id)
    }

    pub fn get_all_folders(&self) -> Vec<&SessionFolder> {
        self.folders.values().collect()
    }

    pub fn folder_count(&self) -> usize {
        self.folders.len()
    }

    /// Folders whose `parent_id` equals `parent` (`None` = root level).
    pub fn get_child_folders(&self, parent: Option<&str>) -> Vec<&SessionFolder> {
        self.folders
            .values()
            .filter(|f| f.parent_id.as_deref() == parent)
            .collect()
    }
}

// ── Tests ────────────────────────────────────────────────────────
