//! Session management — entity model, in-memory index, persistence, backup,
//! and store events.
//!
//! Sessions are stored as one JSON file per session under `sessions/`, with
//! an `index.json` at the store root carrying folders and per-session
//! metadata for fast startup.

pub mod backup;
pub mod events;
pub mod manager;
pub mod model;
pub mod types;

pub use events::{SessionEventBus, StoreEvent};
pub use manager::SessionManager;
pub use model::{SessionPatch, SessionsModel};
pub use types::{LoadStrategy, SessionFolder, SessionIndex, SessionItem, SessionSummary};
