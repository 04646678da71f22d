#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::doc_markdown,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::return_self_not_must_use,
    clippy::uninlined_format_args
)]

//! Session persistence and indexing core for the AgentDeck desktop shell.
//!
//! The UI layers (session browser, command editor, task controller) are
//! external consumers: they construct a [`SessionManager`] with a
//! [`StoreConfig`], drive it through its public operations, and subscribe to
//! [`StoreEvent`]s to refresh their views.

pub mod config;
pub mod session;

pub use config::StoreConfig;
pub use session::{
    LoadStrategy, SessionFolder, SessionItem, SessionManager, SessionsModel, StoreEvent,
};
