//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::{
    config::Config,
    judge::JudgeFeed,
    services::{ContestLocks, SubmissionMonitor},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool
    db: PgPool,

    /// Redis connection manager (notification sink)
    redis: ConnectionManager,

    /// External judge feed client
    judge: Arc<dyn JudgeFeed>,

    /// Submission poller supervisor
    monitor: SubmissionMonitor,

    /// Per-contest scoring locks
    locks: ContestLocks,

    /// Application configuration
    config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        db: PgPool,
        redis: ConnectionManager,
        judge: Arc<dyn JudgeFeed>,
        monitor: SubmissionMonitor,
        locks: ContestLocks,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                redis,
                judge,
                monitor,
                locks,
                config,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a clone of the Redis connection manager
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    /// Get a reference to the judge feed client
    pub fn judge(&self) -> &dyn JudgeFeed {
        self.inner.judge.as_ref()
    }

    /// Get a reference to the submission monitor
    pub fn monitor(&self) -> &SubmissionMonitor {
        &self.inner.monitor
    }

    /// Get a reference to the per-contest scoring locks
    pub fn locks(&self) -> &ContestLocks {
        &self.inner.locks
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
