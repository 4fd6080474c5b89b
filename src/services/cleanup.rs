//! Cleanup service for expired sessions and old analytics
//!
//! Runs as a background task on startup, then periodically.
//! - Deletes user_sessions where expires_at < NOW()
//! - Prunes analytics_events past the retention window

use sqlx::PgPool;
use std::time::Duration;
use tokio::time;

use crate::db::repository::{analytics, sessions};

/// Configuration for the cleanup service
pub struct CleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_secs: u64,
    /// Analytics rows older than this many days are dropped
    pub analytics_retention_days: i64,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600, // Run every hour
            analytics_retention_days: 90,
        }
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    pub sessions_deleted: u64,
    pub analytics_deleted: u64,
    pub errors: Vec<String>,
}

impl CleanupResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn total_deleted(&self) -> u64 {
        self.sessions_deleted + self.analytics_deleted
    }
}

/// Run a single cleanup cycle
pub async fn run_cleanup(pool: &PgPool, config: &CleanupConfig) -> CleanupResult {
    let mut result = CleanupResult::default();

    match sessions::delete_expired(pool).await {
        Ok(count) => {
            result.sessions_deleted = count;
            if count > 0 {
                tracing::info!("Cleanup: deleted {} expired sessions", count);
            }
        }
        Err(e) => {
            result.errors.push(format!("Session cleanup failed: {}", e));
            tracing::error!("Cleanup: session cleanup failed: {}", e);
        }
    }

    match analytics::delete_older_than_days(pool, config.analytics_retention_days).await {
        Ok(count) => {
            result.analytics_deleted = count;
            if count > 0 {
                tracing::info!("Cleanup: deleted {} old analytics events", count);
            }
        }
        Err(e) => {
            result.errors.push(format!("Analytics cleanup failed: {}", e));
            tracing::error!("Cleanup: analytics cleanup failed: {}", e);
        }
    }

    result
}

/// Start the background cleanup task
///
/// Runs immediately on startup, then periodically at the configured
/// interval. This should be spawned with `tokio::spawn`.
pub async fn start_cleanup_task(pool: PgPool, config: CleanupConfig) {
    tracing::info!(
        "Starting cleanup task (interval: {}s, analytics retention: {}d)",
        config.interval_secs,
        config.analytics_retention_days
    );

    let result = run_cleanup(&pool, &config).await;
    if result.total_deleted() > 0 {
        tracing::info!(
            "Initial cleanup complete: {} sessions, {} analytics events deleted",
            result.sessions_deleted,
            result.analytics_deleted
        );
    }

    let mut interval = time::interval(Duration::from_secs(config.interval_secs));

    loop {
        interval.tick().await;

        let result = run_cleanup(&pool, &config).await;
        if !result.is_success() {
            for error in &result.errors {
                tracing::warn!("Cleanup error: {}", error);
            }
        }
    }
}
