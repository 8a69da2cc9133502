//! Error types for matrix decompositions

use parla_core::LinalgError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecompError {
    #[error("Linear algebra error: {0}")]
    LinalgError(#[from] LinalgError),

    #[error("Matrix is not symmetric positive definite (pivot {pivot} at row {row})")]
    NotPositiveDefinite { row: usize, pivot: f64 },

    #[error("Triangular matrix is singular: zero on the diagonal at row {row}")]
    Singular { row: usize },
}

/// Result type for decompositions and triangular solves
pub type DecompResult<T> = Result<T, DecompError>;
