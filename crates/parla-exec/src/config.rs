//! Pool configuration

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// Environment variable overriding the default worker count
pub const NUM_THREADS_ENV: &str = "PARLA_NUM_THREADS";

/// Configuration for a [`ThreadPool`](crate::ThreadPool)
///
/// # Example
///
/// ```
/// use parla_exec::PoolConfig;
///
/// let config = PoolConfig::default()
///     .with_num_threads(4)
///     .with_thread_name_prefix("solver");
/// assert_eq!(config.num_threads, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of persistent worker threads
    pub num_threads: usize,
    /// Worker threads are named `{prefix}-{id}`
    pub thread_name_prefix: String,
    /// Stack size per worker in bytes (platform default when `None`)
    pub stack_size: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_threads: default_num_threads(),
            thread_name_prefix: "parla-worker".to_string(),
            stack_size: None,
        }
    }
}

impl PoolConfig {
    /// Set the number of worker threads
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Set the worker thread name prefix
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the worker stack size in bytes
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Check the configuration before any thread is spawned
    pub fn validate(&self) -> PoolResult<()> {
        if self.num_threads == 0 {
            return Err(PoolError::invalid_config(
                "a pool needs at least one worker thread",
            ));
        }
        if self.stack_size == Some(0) {
            return Err(PoolError::invalid_config("stack size must be non-zero"));
        }
        Ok(())
    }
}

/// Worker count from `PARLA_NUM_THREADS`, else the available parallelism
fn default_num_threads() -> usize {
    std::env::var(NUM_THREADS_ENV)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
}
