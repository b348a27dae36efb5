// ABOUTME: Environment-driven service configuration read once at startup
// ABOUTME: Scheduler interval, batch size, task deadline, and database URL with warned fallbacks
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service configuration.
//!
//! Configuration is read from the environment exactly once at startup and
//! never hot-reloaded. Unparsable values fall back to defaults with a warning
//! rather than aborting startup.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Default sync interval in hours
pub const DEFAULT_SYNC_INTERVAL_HOURS: u64 = 6;

/// Default number of connections synced concurrently per batch
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 10;

/// Default per-task deadline for scheduled syncs in seconds
pub const DEFAULT_SYNC_TASK_TIMEOUT_SECS: u64 = 300;

/// Default delay before the warm-up run after scheduler start
const DEFAULT_WARMUP_DELAY: Duration = Duration::from_secs(30);

/// Default outbound rate-limiting delay between batches
const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(5);

/// Scheduler timing and batching configuration.
///
/// Fixed at construction; the scheduler never re-reads the environment.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Period between scheduled sync runs
    pub interval: Duration,
    /// Connections synced concurrently per batch
    pub batch_size: usize,
    /// Delay before the warm-up run after start
    pub warmup_delay: Duration,
    /// Delay inserted between batches as outbound rate limiting
    pub batch_delay: Duration,
    /// Deadline applied to each scheduled per-connection sync task
    pub task_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_HOURS * 3600),
            batch_size: DEFAULT_SYNC_BATCH_SIZE,
            warmup_delay: DEFAULT_WARMUP_DELAY,
            batch_delay: DEFAULT_BATCH_DELAY,
            task_timeout: Duration::from_secs(DEFAULT_SYNC_TASK_TIMEOUT_SECS),
        }
    }
}

impl SchedulerConfig {
    /// Build the scheduler configuration from the environment.
    ///
    /// Reads `SYNC_INTERVAL_HOURS`, `SYNC_BATCH_SIZE`, and
    /// `SYNC_TASK_TIMEOUT_SECS`. Unparsable values fall back to the defaults
    /// with a warning; a batch size of 0 is corrected to 1.
    #[must_use]
    pub fn from_env() -> Self {
        let interval_hours = env_parse("SYNC_INTERVAL_HOURS", DEFAULT_SYNC_INTERVAL_HOURS);
        let batch_size = env_parse("SYNC_BATCH_SIZE", DEFAULT_SYNC_BATCH_SIZE);
        let timeout_secs = env_parse("SYNC_TASK_TIMEOUT_SECS", DEFAULT_SYNC_TASK_TIMEOUT_SECS);

        let batch_size = if batch_size == 0 {
            warn!("SYNC_BATCH_SIZE of 0 corrected to 1");
            1
        } else {
            batch_size
        };

        Self {
            interval: Duration::from_secs(interval_hours.saturating_mul(3600)),
            batch_size,
            task_timeout: Duration::from_secs(timeout_secs),
            ..Self::default()
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Database connection URL
    pub database_url: String,
    /// Scheduler timing and batching
    pub scheduler: SchedulerConfig,
}

impl ServiceConfig {
    /// Build the full service configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/reviewsync.db".into());

        Self {
            database_url,
            scheduler: SchedulerConfig::from_env(),
        }
    }

    /// One-line summary for startup logging, without secrets.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "database={} interval={}s batch_size={} task_timeout={}s",
            self.database_url,
            self.scheduler.interval.as_secs(),
            self.scheduler.batch_size,
            self.scheduler.task_timeout.as_secs()
        )
    }
}

/// Parse an environment variable, falling back to a default with a warning on
/// garbage input.
fn env_parse<T: std::str::FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Invalid {key} value '{raw}', using default {default}");
            default
        }),
        Err(_) => default,
    }
}
