//! Store configuration — an explicit struct passed at construction, with no
//! global settings lookup.

use crate::session::LoadStrategy;
use directories::UserDirs;
use std::path::PathBuf;

/// Where the store lives and how it loads.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base directory holding `index.json` and `sessions/`.
    pub base_dir: PathBuf,
    /// How `load_sessions` populates the in-memory model.
    pub strategy: LoadStrategy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        Self {
            base_dir: home.join(".agentdeck").join("sessions"),
            strategy: LoadStrategy::default(),
        }
    }
}

impl StoreConfig {
    /// A config rooted at `base_dir` — the override every embedding UI and
    /// test uses for isolation.
    pub fn at(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_strategy(mut self, strategy: LoadStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_home_store() {
        let config = StoreConfig::default();
        assert!(config.base_dir.ends_with(".agentdeck/sessions"));
        assert_eq!(config.strategy, LoadStrategy::Eager);
    }

    #[test]
    fn builder_overrides() {
        let config = StoreConfig::at("/tmp/store").with_strategy(LoadStrategy::Lazy);
        assert_eq!(config.base_dir, PathBuf::from("/tmp/store"));
        assert_eq!(config.strategy, LoadStrategy::Lazy);
    }
}
