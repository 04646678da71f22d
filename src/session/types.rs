//! Session entity types — items, folders, index entries, and the load strategy.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Current time as an RFC 3339 string. RFC 3339 in UTC sorts
/// chronologically as plain text, which recency ordering relies on.
pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

/// How the manager populates the in-memory model at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStrategy {
    /// Parse every file under `sessions/` up front. Startup cost grows with
    /// total content size; survives a lost or corrupt index.
    #[default]
    Eager,
    /// Read only `index.json`; session content is fetched on first access.
    /// Startup cost is one file regardless of store size.
    Lazy,
}

// ── SessionItem ──────────────────────────────────────────────────

/// A single saved prompt/response interaction with metadata.
///
/// Serialized as `sessions/<id>.json`. `prompt` and `response` are empty on
/// items built from the index; `content_loaded` tracks whether they reflect
/// the on-disk content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionItem {
    /// Assigned once at construction, never changes.
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub response: String,
    /// Execution mode that produced the response.
    #[serde(default)]
    pub flow_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default = "now_rfc3339")]
    pub created: String,
    #[serde(default = "now_rfc3339")]
    pub updated: String,
    /// False only for index-built placeholders awaiting hydration. A full
    /// session file always carries content, so deserialization defaults to
    /// true.
    #[serde(skip_serializing, default = "default_true")]
    pub content_loaded: bool,
}

impl SessionItem {
    pub fn new(
        title: impl Into<String>,
        prompt: impl Into<String>,
        response: impl Into<String>,
        flow_type: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: new_id(),
            title: title.into(),
            prompt: prompt.into(),
            response: response.into(),
            flow_type: flow_type.into(),
            tags,
            favorite: false,
            created: now.clone(),
            updated: now,
            content_loaded: true,
        }
    }

    /// Metadata-only placeholder from an index entry. The map key is
    /// authoritative for the id.
    pub fn from_summary(id: impl Into<String>, summary: SessionSummary) -> Self {
        Self {
            id: id.into(),
            title: summary.title,
            prompt: String::new(),
            response: String::new(),
            flow_type: String::new(),
            tags: summary.tags,
            favorite: summary.favorite,
            created: summary.created,
            updated: summary.updated,
            content_loaded: false,
        }
    }

    fn touch(&mut self) {
        self.updated = now_rfc3339();
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_content(
        &mut self,
        prompt: impl Into<String>,
        response: impl Into<String>,
        flow_type: impl Into<String>,
    ) {
        self.prompt = prompt.into();
        self.response = response.into();
        self.flow_type = flow_type.into();
        self.content_loaded = true;
        self.touch();
    }

    /// Flip the favorite flag and return the new value.
    pub fn toggle_favorite(&mut self) -> bool {
        self.favorite = !self.favorite;
        self.touch();
        self.favorite
    }

    /// Add a tag. Returns false for empty or duplicate tags.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        self.touch();
        true
    }

    /// Remove a tag. Returns false when the tag was not present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        if self.tags.len() == before {
            return false;
        }
        self.touch();
        true
    }

    /// Whole days since `created`. Zero when the timestamp does not parse.
    pub fn age_days(&self) -> i64 {
        chrono::DateTime::parse_from_rfc3339(&self.created)
            .map(|created| (Utc::now() - created.with_timezone(&Utc)).num_days())
            .unwrap_or(0)
    }
}

// ── SessionFolder ────────────────────────────────────────────────

/// A named grouping node in the optional folder hierarchy.
///
/// Folders have no file of their own; they live only inside `index.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionFolder {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// None for root-level folders. May dangle after a parent is deleted;
    /// such folders are unreachable from hierarchy traversal, not an error.
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default = "now_rfc3339")]
    pub created: String,
}

impl SessionFolder {
    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            parent_id,
            created: now_rfc3339(),
        }
    }
}

// ── Index document ───────────────────────────────────────────────

/// Per-session metadata stored in the index — everything except content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default = "now_rfc3339")]
    pub created: String,
    #[serde(default = "now_rfc3339")]
    pub updated: String,
}

impl From<&SessionItem> for SessionSummary {
    fn from(session: &SessionItem) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            tags: session.tags.clone(),
            favorite: session.favorite,
            created: session.created.clone(),
            updated: session.updated.clone(),
        }
    }
}

/// The `index.json` document: the full folder list plus per-session
/// metadata. Authoritative for listing and search without touching any
/// session file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionIndex {
    #[serde(default)]
    pub folders: Vec<SessionFolder>,
    #[serde(default)]
    pub sessions: HashMap<String, SessionSummary>,
}

// ── Tests ────────────────────────────────────────────────────────
