//! Error types for iterative solvers

use parla_core::LinalgError;
use parla_exec::PoolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] LinalgError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("Solver did not converge in {iterations} iterations (residual = {residual:.2e})")]
    NotConverged { iterations: usize, residual: f64 },

    #[error("Solver breakdown at iteration {iteration}: search direction has zero curvature")]
    Breakdown { iteration: usize },

    #[error("Zero diagonal element at row {row}")]
    ZeroDiagonal { row: usize },

    #[error("Invalid solver configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for solver operations
pub type SolveResult<T> = Result<T, SolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_converged_display() {
        let err = SolveError::NotConverged {
            iterations: 50,
            residual: 1.5e-3,
        };
        assert_eq!(
            err.to_string(),
            "Solver did not converge in 50 iterations (residual = 1.50e-3)"
        );
    }

    #[test]
    fn test_pool_error_is_transparent() {
        let err: SolveError = PoolError::PoolBusy.into();
        assert_eq!(err.to_string(), PoolError::PoolBusy.to_string());
    }
}
