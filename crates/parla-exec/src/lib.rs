//! # parla-exec
//!
//! Execution layer for Parla: a persistent, fixed-size thread pool with
//! synchronous, barrier-joined data-parallel dispatch.
//!
//! This crate provides:
//! - [`WorkRange`] and the partition rule shared by every dispatch
//! - [`JoinGate`], the counting gate a caller blocks on until workers finish
//! - [`ThreadPool`], the worker set itself, configured by [`PoolConfig`]
//! - [`Dispatch`], the sequential-or-pool seam every kernel is written against
//!
//! ## Quick Start
//!
//! ```
//! use parla_exec::{Dispatch, ThreadPool};
//!
//! let pool = ThreadPool::new(4).unwrap();
//! let mut data = vec![1.0_f64; 1000];
//!
//! // Each worker receives its own disjoint segment of `data`
//! Dispatch::Pool(&pool)
//!     .for_each_mut(&mut data, |i, x| *x *= i as f64)
//!     .unwrap();
//!
//! let partials = Dispatch::Pool(&pool)
//!     .map_partitions(data.len(), |r| data[r.start..r.end].iter().sum::<f64>())
//!     .unwrap();
//! assert_eq!(partials.iter().sum::<f64>(), 499_500.0);
//! ```
//!
//! ## Concurrency model
//!
//! Dispatch is synchronous: the calling thread blocks until every assigned
//! worker has arrived at the gate. A pool holds one job at a time, so a
//! second dispatch while one is in flight fails with [`PoolError::PoolBusy`].
//! Panics inside a task are caught on the worker and reported as
//! [`PoolError::TaskPanicked`] once all workers of that dispatch are done.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod pool;
pub mod range;

pub use config::{PoolConfig, NUM_THREADS_ENV};
pub use dispatch::Dispatch;
pub use error::{PoolError, PoolResult};
pub use gate::JoinGate;
pub use pool::ThreadPool;
pub use range::WorkRange;
