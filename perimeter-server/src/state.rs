use std::sync::Arc;
use std::time::{Duration, Instant};

use perimeter_backend::RuleBackend;
use perimeter_rules::RuleService;

use crate::config::ServerConfig;

/// State shared across request handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub rules: RuleService,
    start_time: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let backend = config.build_backend();
        Self::with_backend(config, backend)
    }

    /// Build state over an externally constructed backend, so tests can keep
    /// a handle on it.
    pub fn with_backend(config: ServerConfig, backend: Arc<dyn RuleBackend>) -> Self {
        Self {
            config,
            rules: RuleService::new(backend),
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}
