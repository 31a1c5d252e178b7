use std::sync::Arc;
use std::time::Duration;

use shared_config::AppConfig;
use shared_models::time::{Clock, SystemClock};

use crate::memory::MemoryStore;

/// Shared application state threaded through every router. Carries the
/// configuration, the store, and the clock so request handlers never
/// reach for ambient environment state.
pub struct AppState {
    pub config: AppConfig,
    pub store: MemoryStore,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = MemoryStore::new(Duration::from_millis(config.store_timeout_ms));
        Self {
            config,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Self {
        let store = MemoryStore::new(Duration::from_millis(config.store_timeout_ms));
        Self {
            config,
            store,
            clock,
        }
    }
}
