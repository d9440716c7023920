//! # App Context
//!
//! Application state shared by every route handler and the battery audit task.

use std::sync::Arc;

use medlift_persistence::{Fleet, MemoryStore};

use crate::config::Config;

/// Fleet service over the in-memory backend
pub type FleetService = Fleet<MemoryStore>;

/// Application context shared across all handlers
#[derive(Debug, Clone)]
pub struct AppContext {
    /// Fleet operations
    pub fleet: FleetService,

    /// Active configuration
    pub config: Arc<Config>,
}

impl AppContext {
    #[must_use]
    pub fn new(store: MemoryStore, config: Config) -> Self {
        Self {
            fleet: Fleet::new(store),
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }
}

/// Builder for [`AppContext`]
#[derive(Debug, Default)]
pub struct AppContextBuilder {
    store: Option<MemoryStore>,
    config: Option<Config>,
}

impl AppContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Missing parts fall back to an empty store and the default configuration.
    #[must_use]
    pub fn build(self) -> AppContext {
        AppContext::new(
            self.store.unwrap_or_default(),
            self.config.unwrap_or_default(),
        )
    }
}
