//! Error types for the thread pool

use thiserror::Error;

/// Errors raised by the thread pool and its dispatch helpers
#[derive(Error, Debug)]
pub enum PoolError {
    /// A job was handed to a worker that is still executing a previous one
    #[error("Worker {worker} is already executing a job")]
    ThreadMisuse { worker: usize },

    /// A second dispatch was attempted while one is still in flight on the same pool
    #[error("Thread pool is already dispatching a job; pools are not reentrant")]
    PoolBusy,

    /// The pool was stopped and cannot accept work anymore
    #[error("Thread pool has been stopped")]
    Stopped,

    /// A task panicked on a worker; the first failure of a dispatch is reported
    #[error("Task panicked on worker {worker}: {message}")]
    TaskPanicked { worker: usize, message: String },

    /// The operating system refused to spawn a worker thread
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// Pool configuration rejected at construction time
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
}

impl PoolError {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Build a [`PoolError::TaskPanicked`] from a caught panic payload
    pub(crate) fn from_panic(worker: usize, payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::TaskPanicked { worker, message }
    }
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_payload_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        match PoolError::from_panic(3, payload.as_ref()) {
            PoolError::TaskPanicked { worker, message } => {
                assert_eq!(worker, 3);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        let err = PoolError::from_panic(0, payload.as_ref());
        assert_eq!(err.to_string(), "Task panicked on worker 0: owned");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            PoolError::ThreadMisuse { worker: 2 }.to_string(),
            "Worker 2 is already executing a job"
        );
        assert!(PoolError::invalid_config("zero threads")
            .to_string()
            .contains("zero threads"));
    }
}
