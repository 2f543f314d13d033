//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;

/// Shared application state
///
/// The pool is opened once at startup and borrowed by every request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, db: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, db }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Close the database pool
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down application state...");
        self.inner.db.close().await;
    }
}
