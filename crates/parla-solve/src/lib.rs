//! # parla-solve
//!
//! Iterative solvers built on the Parla pool and matrix abstraction.
//!
//! [`ConjugateGradient`] solves `A·x = b` for symmetric positive definite `A`
//! in any representation implementing [`Matrix`](parla_core::Matrix). Every
//! product, update and reduction of an iteration is dispatched on the supplied
//! [`ThreadPool`](parla_exec::ThreadPool).
//!
//! # Configuration
//!
//! | Field | Default | Meaning |
//! |-------|---------|---------|
//! | `tolerance` | `1e-14` | stop once `‖r‖ < tolerance` |
//! | `preconditioner` | `None` | `None` or `Jacobi` (`C = 1/diag(A)`) |
//! | `max_iterations` | `None` | optional cap, `NotConverged` when hit |
//!
//! # Example
//!
//! ```
//! use parla_core::{generate::spd_matrix, DenseVector};
//! use parla_exec::ThreadPool;
//! use parla_solve::{ConjugateGradient, PreconditionerKind, ProgressLog, SolverConfig};
//! use parla_sparse::CsrMatrix;
//!
//! let pool = ThreadPool::new(2).unwrap();
//! let a: CsrMatrix = spd_matrix(50, 7);
//! let b = DenseVector::filled(50, 1.0);
//!
//! let config = SolverConfig::default()
//!     .with_tolerance(1e-10)
//!     .with_preconditioner(PreconditionerKind::Jacobi);
//! let mut log = ProgressLog::new();
//! let solution = ConjugateGradient::new(config)
//!     .solve_with_progress(&a, &b, &DenseVector::zeros(50), &pool, &mut log)
//!     .unwrap();
//!
//! assert!(solution.info.converged);
//! assert_eq!(log.len(), solution.info.iterations);
//! ```

pub mod cg;
pub mod config;
pub mod error;
pub mod precond;
pub mod progress;

pub use cg::{ConjugateGradient, Solution, SolverInfo};
pub use config::{PreconditionerKind, SolverConfig, DEFAULT_TOLERANCE};
pub use error::{SolveError, SolveResult};
pub use precond::{IdentityPreconditioner, JacobiPreconditioner, Preconditioner};
pub use progress::{NoProgress, ProgressEvent, ProgressLog, ProgressReporter, TracingProgress};
