//! Session persistence — a directory-backed JSON store with an index file.
//!
//! One JSON file per session under `sessions/`, plus an `index.json` at the
//! store root carrying the folder list and per-session metadata. The index
//! makes listing and search possible without reading any session file and is
//! rewritten in full after every mutation; individual session files stay
//! authoritative for content.
//!
//! Every operation runs synchronously on the caller's thread with blocking
//! file I/O. There is no cross-process locking: single writer, single
//! reader.

use super::backup;
use super::events::{SessionEventBus, StoreEvent};
use super::model::SessionsModel;
use super::types::{
    now_rfc3339, LoadStrategy, SessionFolder, SessionIndex, SessionItem, SessionSummary,
};
use crate::config::StoreConfig;

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Durable session storage under a single base directory.
pub struct SessionManager {
    config: StoreConfig,
    model: SessionsModel,
    events: SessionEventBus,
}

impl SessionManager {
    /// Create the store directories and load existing data per
    /// `config.strategy`.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut manager = Self {
            config,
            model: SessionsModel::new(),
            events: SessionEventBus::new(),
        };
        manager.ensure_directories()?;
        manager.load_sessions()?;
        Ok(manager)
    }

    pub fn model(&self) -> &SessionsModel {
        &self.model
    }

    pub fn events(&self) -> &SessionEventBus {
        &self.events
    }

    // ── Paths ────────────────────────────────────────────────────

    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }

    fn sessions_dir(&self) -> PathBuf {
        self.config.base_dir.join("sessions")
    }

    fn index_path(&self) -> PathBuf {
        self.config.base_dir.join("index.json")
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.sessions_dir().join(format!("{id}.json"))
    }

    fn ensure_directories(&self) -> Result<()> {
        let sessions_dir = self.sessions_dir();
        fs::create_dir_all(&sessions_dir)
            .with_context(|| format!("creating sessions directory {}", sessions_dir.display()))?;
        Ok(())
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Rebuild the model from disk, then seed default folders if the store
    /// carried none. Emits [`StoreEvent::SessionsLoaded`].
    pub fn load_sessions(&mut self) -> Result<()> {
        let started = Instant::now();
        self.model = SessionsModel::new();

        match (self.config.strategy, self.read_index()) {
            (LoadStrategy::Lazy, Some(index)) => self.load_from_index(index),
            (LoadStrategy::Eager, Some(index)) => {
                for folder in index.folders {
                    self.model.add_folder(folder);
                }
                self.scan_session_files()?;
            }
            // No usable index: the directory scan is the only recovery path,
            // whatever the configured strategy.
            (_, None) => self.scan_session_files()?,
        }

        self.model.ensure_default_folders();

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            sessions = self.model.session_count(),
            folders = self.model.folder_count(),
            "session store loaded"
        );
        self.events.emit(&StoreEvent::SessionsLoaded);
        Ok(())
    }

    /// Parse `index.json`, or None when it is absent or unreadable.
    fn read_index(&self) -> Option<SessionIndex> {
        let index_path = self.index_path();
        let data = match fs::read_to_string(&index_path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %index_path.display(), error = %e, "failed to read index");
                return None;
            }
        };
        match serde_json::from_str(&data) {
            Ok(index) => Some(index),
            Err(e) => {
                tracing::warn!(path = %index_path.display(), error = %e, "corrupt index; falling back to directory scan");
                None
            }
        }
    }

    /// Metadata-only load: folders and session placeholders straight from
    /// the index, content left for on-demand hydration.
    fn load_from_index(&mut self, index: SessionIndex) {
        for folder in index.folders {
            self.model.add_folder(folder);
        }
        for (id, summary) in index.sessions {
            self.model.add_session(SessionItem::from_summary(id, summary));
        }
    }

    /// Full load: parse every `sessions/*.json`. A file that cannot be read
    /// or parsed is logged and skipped — one bad file must not abort
    /// startup.
    fn scan_session_files(&mut self) -> Result<()> {
        let sessions_dir = self.sessions_dir();
        if !sessions_dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(&sessions_dir)
            .with_context(|| format!("reading sessions directory {}", sessions_dir.display()))?;
        for entry in entries {
            let entry = entry
                .with_context(|| format!("reading entry in {}", sessions_dir.display()))?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str::<SessionItem>(&data) {
                    Ok(session) => {
                        self.model.add_session(session);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "skipping unparsable session file");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable session file");
                }
            }
        }
        Ok(())
    }

    /// Hydrate a metadata-only session in place, reading its file at most
    /// once. Returns the (possibly still metadata-only) session, or None
    /// when the id is unknown or its file is corrupt.
    pub fn load_session_content(&mut self, id: &str) -> Result<Option<&SessionItem>> {
        let needs_load = match self.model.get_session(id) {
            None => return Ok(None),
            Some(session) => !session.content_loaded,
        };

        if needs_load {
            let path = self.session_path(id);
            match fs::read_to_string(&path) {
                Ok(data) => match serde_json::from_str::<SessionItem>(&data) {
                    Ok(full) => {
                        if let Some(session) = self.model.get_session_mut(id) {
                            session.prompt = full.prompt;
                            session.response = full.response;
                            session.flow_type = full.flow_type;
                            session.content_loaded = true;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "corrupt session file");
                        return Ok(None);
                    }
                },
                // Indexed but the file is gone; hand back the metadata.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("reading session file {}", path.display()));
                }
            }
        }

        Ok(self.model.get_session(id))
    }

    /// A session with guaranteed content, hydrating or reading from disk as
    /// needed. Falls back to the file when the model has never seen the id
    /// (the index may have lost it).
    pub fn load_session(&mut self, id: &str) -> Result<Option<SessionItem>> {
        if self.model.get_session(id).is_some() {
            return Ok(self.load_session_content(id)?.cloned());
        }

        let path = self.session_path(id);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading session file {}", path.display()));
            }
        };
        match serde_json::from_str::<SessionItem>(&data) {
            Ok(session) => {
                self.model.add_session(session.clone());
                Ok(Some(session))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt session file");
                Ok(None)
            }
        }
    }

    // ── Saving and deleting ──────────────────────────────────────

    /// Insert or overwrite a session, write its file, and rewrite the index.
    /// A known id gets a fresh `updated` stamp first. Returns the id.
    ///
    /// On error the in-memory model may already carry the new state while
    /// the disk does not — an accepted inconsistency; the next successful
    /// save or reload converges.
    pub fn save_session(&mut self, mut session: SessionItem) -> Result<String> {
        let id = session.id.clone();
        if self.model.get_session(&id).is_some() {
            session.updated = now_rfc3339();
        }
        session.content_loaded = true;
        self.model.add_session(session.clone());

        self.ensure_directories()?;
        let path = self.session_path(&id);
        let data = serde_json::to_string_pretty(&session).context("serializing session")?;
        fs::write(&path, data)
            .with_context(|| format!("writing session file {}", path.display()))?;

        self.write_index()?;
        self.events.emit(&StoreEvent::SessionSaved(id.clone()));
        Ok(id)
    }

    /// Create and save a session from the editor's current input/output.
    /// An empty title is derived from the prompt's first line; when that is
    /// too short a timestamped fallback is used.
    pub fn create_session_from_current(
        &mut self,
        title: &str,
        prompt: &str,
        response: &str,
        flow_type: &str,
        tags: Vec<String>,
    ) -> Result<String> {
        let title = if title.trim().is_empty() {
            derive_title(prompt)
        } else {
            title.to_string()
        };
        let session = SessionItem::new(title, prompt, response, flow_type, tags);
        self.save_session(session)
    }

    /// Remove a session from the model and disk, then rewrite the index.
    /// Returns false when the id was not in the model. A missing file is
    /// not an error, so the operation is idempotent.
    pub fn delete_session(&mut self, id: &str) -> Result<bool> {
        let existed = self.model.delete_session(id);

        let path = self.session_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("deleting session file {}", path.display()));
            }
        }

        self.write_index()?;
        self.events.emit(&StoreEvent::SessionDeleted(id.to_string()));
        Ok(existed)
    }

    /// Rewrite `index.json` in full from the current model, via a temp file
    /// and rename so a crash mid-write never corrupts the index.
    fn write_index(&self) -> Result<()> {
        let index = SessionIndex {
            folders: self.model.get_all_folders().into_iter().cloned().collect(),
            sessions: self
                .model
                .get_all_sessions()
                .into_iter()
                .map(|s| (s.id.clone(), SessionSummary::from(s)))
                .collect(),
        };
        let data = serde_json::to_string_pretty(&index).context("serializing index")?;

        let index_path = self.index_path();
        let tmp_path = index_path.with_extension("json.tmp");
        fs::write(&tmp_path, &data)
            .with_context(|| format!("writing temp index {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &index_path).with_context(|| {
            format!(
                "renaming {} to {}",
                tmp_path.display(),
                index_path.display()
            )
        })?;
        Ok(())
    }

    // ── Favorites and tags ───────────────────────────────────────

    /// Flip a session's favorite flag and persist. None when the id is
    /// unknown; otherwise the new value.
    pub fn toggle_favorite(&mut self, id: &str) -> Result<Option<bool>> {
        let Some(session) = self.model.get_session_mut(id) else {
            return Ok(None);
        };
        let favorite = session.toggle_favorite();
        let session = session.clone();
        self.save_session(session)?;
        Ok(Some(favorite))
    }

    /// Add a tag and persist. False when the id is unknown or the tag was
    /// already present.
    pub fn add_tag_to_session(&mut self, id: &str, tag: &str) -> Result<bool> {
        let Some(session) = self.model.get_session_mut(id) else {
            return Ok(false);
        };
        if !session.add_tag(tag) {
            return Ok(false);
        }
        let session = session.clone();
        self.save_session(session)?;
        Ok(true)
    }

    /// Remove a tag and persist. False when the id is unknown or the tag
    /// was absent.
    pub fn remove_tag_from_session(&mut self, id: &str, tag: &str) -> Result<bool> {
        let Some(session) = self.model.get_session_mut(id) else {
            return Ok(false);
        };
        if !session.remove_tag(tag) {
            return Ok(false);
        }
        let session = session.clone();
        self.save_session(session)?;
        Ok(true)
    }

    pub fn get_all_tags(&self) -> Vec<String> {
        self.model.get_all_tags()
    }

    // ── Folders ──────────────────────────────────────────────────

    /// Create a folder and rewrite the index (folders live only there).
    pub fn create_folder(&mut self, name: &str, parent_id: Option<&str>) -> Result<String> {
        let folder = SessionFolder::new(name, parent_id.map(String::from));
        let id = self.model.add_folder(folder);
        self.write_index()?;
        Ok(id)
    }

    /// Rename a folder. False when the id is unknown.
    pub fn rename_folder(&mut self, id: &str, name: &str) -> Result<bool> {
        if !self.model.update_folder(id, name) {
            return Ok(false);
        }
        self.write_index()?;
        Ok(true)
    }

    /// Delete a folder node. Contained sessions and child folders are not
    /// touched — children keep a dangling `parent_id` and drop out of
    /// hierarchy traversal. False when the id is unknown.
    pub fn delete_folder(&mut self, id: &str) -> Result<bool> {
        if !self.model.delete_folder(id) {
            return Ok(false);
        }
        self.write_index()?;
        Ok(true)
    }

    // ── Queries ──────────────────────────────────────────────────

    pub fn search_sessions(&self, query: &str, tags: &[String]) -> Vec<&SessionItem> {
        self.model.search_sessions(query, tags)
    }

    pub fn get_recent_sessions(&self, limit: usize) -> Vec<&SessionItem> {
        self.model.get_recent_sessions(limit)
    }

    pub fn get_favorite_sessions(&self) -> Vec<&SessionItem> {
        self.model.get_favorite_sessions()
    }

    // ── Backup and restore ───────────────────────────────────────

    /// Archive the whole store (index, session files, directory layout)
    /// into a gzip tarball at `backup_path`.
    pub fn backup_sessions(&self, backup_path: &Path) -> Result<()> {
        backup::create_archive(&self.config.base_dir, backup_path)
    }

    /// Replace the store with an archive's contents and reload.
    ///
    /// The archive is staged in a temp dir and must contain an `index.json`
    /// at its root; otherwise nothing is touched and false is returned.
    /// Past that check the swap is destructive and non-transactional: an
    /// interruption between delete and copy leaves the store undefined.
    pub fn restore_sessions(&mut self, backup_path: &Path) -> Result<bool> {
        let staging = tempfile::tempdir().context("creating restore staging directory")?;
        backup::extract_archive(backup_path, staging.path())?;

        if !staging.path().join("index.json").exists() {
            tracing::warn!(
                archive = %backup_path.display(),
                "archive has no index.json at its root; refusing to restore"
            );
            return Ok(false);
        }

        backup::replace_dir(staging.path(), &self.config.base_dir)?;
        self.ensure_directories()?;
        self.load_sessions()?;
        Ok(true)
    }
}

/// First line of the prompt, capped at 30 characters; a timestamped
/// fallback when that leaves fewer than 3.
fn derive_title(prompt: &str) -> String {
    let first_line: String = prompt.lines().next().unwrap_or("").chars().take(30).collect();
    let title = first_line.trim();
    if title.chars().count() < 3 {
        format!("Session {}", Utc::now().format("%Y-%m-%d %H:%M"))
    } else {
        title.to_string()
    }
}

// ── Tests ────────────────────────────────────────────────────────
