//! # parla-decomp
//!
//! Dense-kernel decompositions for every Parla matrix representation.
//!
//! **Version:** 0.1.0
//!
//! # Decompositions
//!
//! ## Givens QR
//!
//! Factors any M×N matrix as `A = Q·R` with Q orthogonal and R upper
//! triangular, rotating away one sub-diagonal entry at a time:
//!
//! ```text
//! for i in 1..M, n in 0..min(i, N), R[i,n] != 0:
//!     r = hypot(R[n,n], R[i,n]),  c = R[n,n]/r,  s = -R[i,n]/r
//!     rows n, i of R  <- rotate(c, s)
//!     cols n, i of Q  <- rotate(c, s)
//! ```
//!
//! The [`Determinant`] trait is implemented for every [`Matrix`] and returns
//! the product of R's diagonal (0 for non-square input).
//!
//! ## Cholesky
//!
//! `A = L·Lᵀ` for symmetric positive definite A. [`cholesky`] returns L in the
//! representation of A; [`cholesky_solve`] chains a forward and a transposed
//! backward substitution.
//!
//! # Example
//!
//! ```
//! use parla_core::{generate::spd_matrix, DenseMatrix};
//! use parla_decomp::{cholesky, Determinant};
//!
//! let a: DenseMatrix = spd_matrix(5, 1);
//! assert!(a.determinant() > 0.0);
//! assert!(cholesky(&a).is_ok());
//! ```
//!
//! [`Matrix`]: parla_core::Matrix

pub mod cholesky;
pub mod error;
pub mod qr;
pub mod triangular;

pub use cholesky::cholesky;
pub use error::{DecompError, DecompResult};
pub use qr::{qr_givens, Determinant, QrDecomposition};
pub use triangular::{
    cholesky_solve, solve_lower_transposed, solve_lower_triangular, solve_upper_triangular,
};
