//! # Parla
//!
//! Parallel numerical linear algebra on a persistent, fixed-size thread pool.
//!
//! **Version:** 0.1.0
//!
//! # Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`exec`] | `ThreadPool`, `WorkRange`, `Dispatch` |
//! | [`linalg`] | `Matrix`/`Vector` traits, `DenseMatrix`, `DenseVector`, `Vector2d`, `Vector3d` |
//! | [`sparse`] | `CsrMatrix`, `HashMatrix`, format conversions |
//! | [`decomp`] | Givens QR, `Determinant`, Cholesky, triangular solves |
//! | [`solve`] | `ConjugateGradient`, Jacobi preconditioning, progress reporting |
//!
//! Every arithmetic kernel has three entry points: a sequential form
//! (`add`), a pool-parallel form (`par_add`) and a form taking an explicit
//! [`Dispatch`](exec::Dispatch) (`add_with`). Results agree across thread
//! counts up to floating-point reassociation in reductions.
//!
//! # Quick Start
//!
//! ```
//! use parla::prelude::*;
//!
//! let pool = ThreadPool::new(4).unwrap();
//! let a: CsrMatrix = spd_matrix(100, 1);
//! let b = DenseVector::filled(100, 1.0);
//!
//! let solution = ConjugateGradient::new(SolverConfig::default().with_tolerance(1e-10))
//!     .solve(&a, &b, &DenseVector::zeros(100), &pool)
//!     .unwrap();
//! let check = a.par_mul_vec(&solution.x, &pool).unwrap();
//! assert!(check.approx_eq(&b, 1e-8));
//! assert!(a.determinant() > 0.0);
//! ```

pub mod logging;

pub use parla_core as linalg;
pub use parla_decomp as decomp;
pub use parla_exec as exec;
pub use parla_solve as solve;
pub use parla_sparse as sparse;

/// Commonly used types and traits
pub mod prelude {
    pub use parla_core::generate::spd_matrix;
    pub use parla_core::{
        DenseMatrix, DenseVector, LinalgError, LinalgResult, Matrix, Vector, Vector2d, Vector3d,
    };
    pub use parla_decomp::{cholesky, cholesky_solve, qr_givens, DecompError, Determinant};
    pub use parla_exec::{Dispatch, PoolConfig, PoolError, ThreadPool, WorkRange};
    pub use parla_solve::{
        ConjugateGradient, PreconditionerKind, ProgressEvent, ProgressLog, ProgressReporter,
        SolveError, SolverConfig, TracingProgress,
    };
    pub use parla_sparse::{convert, CsrMatrix, HashMatrix};
}
