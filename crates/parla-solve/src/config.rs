//! Solver configuration

use serde::{Deserialize, Serialize};

use crate::error::{SolveError, SolveResult};

/// Residual norm below which the default solver stops
pub const DEFAULT_TOLERANCE: f64 = 1e-14;

/// Which preconditioner the solver builds from the system matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreconditionerKind {
    /// Plain Conjugate Gradient
    #[default]
    None,
    /// Elementwise reciprocal of the matrix diagonal
    Jacobi,
}

/// Configuration for [`ConjugateGradient`](crate::ConjugateGradient)
///
/// There is no iteration cap unless `max_iterations` is set; a system that
/// is not symmetric positive definite may then iterate forever.
///
/// # Example
///
/// ```
/// use parla_solve::{PreconditionerKind, SolverConfig};
///
/// let config = SolverConfig::default()
///     .with_tolerance(1e-10)
///     .with_preconditioner(PreconditionerKind::Jacobi)
///     .with_max_iterations(500);
/// assert_eq!(config.max_iterations, Some(500));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop once `‖r‖ < tolerance`
    pub tolerance: f64,
    pub preconditioner: PreconditionerKind,
    /// Optional iteration cap; exceeding it yields `SolveError::NotConverged`
    pub max_iterations: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            preconditioner: PreconditionerKind::None,
            max_iterations: None,
        }
    }
}

impl SolverConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_preconditioner(mut self, kind: PreconditionerKind) -> Self {
        self.preconditioner = kind;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Reject tolerances that can never be met
    pub fn validate(&self) -> SolveResult<()> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(SolveError::InvalidConfig(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}
