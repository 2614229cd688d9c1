//! Application state shared across all request handlers.

use crate::config::runtime::RuntimeConfig;
use sqlx::PgPool;
use stablepay_core::framework::DatabaseProcessor;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

#[derive(Clone)]
pub struct AppState {
    /// Runs the `withdrawal_records` processors.
    pub db: DatabaseProcessor,
    /// Swapped as a whole on SIGHUP.
    config: Arc<RwLock<RuntimeConfig>>,
}

impl AppState {
    pub fn new(pool: PgPool, config: RuntimeConfig) -> Self {
        Self {
            db: DatabaseProcessor::new(pool),
            config: Arc::new(RwLock::new(config)),
        }
    }

    pub async fn config(&self) -> RwLockReadGuard<'_, RuntimeConfig> {
        self.config.read().await
    }

    pub async fn replace_config(&self, config: RuntimeConfig) {
        *self.config.write().await = config;
    }
}
