//! Conjugate Gradient for symmetric positive definite systems
//!
//! Every matrix and vector operation of an iteration runs through one
//! [`Dispatch`], so a single pool drives the whole solve:
//!
//! ```text
//! r = b − A·x₀,  h = C⊙r,  d = h
//! loop:
//!     z = A·d
//!     α = (r·h) / (d·z)
//!     x += α·d,  r −= α·z
//!     stop when ‖r‖ < tolerance
//!     h = C⊙r,   β = (r·h)_new / (r·h)_old
//!     d = h + β·d
//! ```
//!
//! Without a preconditioner `C` is the identity and `h = r`.

use std::fmt;
use std::time::{Duration, Instant};

use parla_core::{DenseVector, LinalgError, Matrix, Vector};
use parla_exec::{Dispatch, ThreadPool};

use crate::config::SolverConfig;
use crate::error::{SolveError, SolveResult};
use crate::progress::{NoProgress, ProgressEvent, ProgressReporter};

/// Solver convergence information
#[derive(Debug, Clone, PartialEq)]
pub struct SolverInfo {
    /// Number of iterations performed
    pub iterations: usize,
    /// Final residual norm
    pub residual: f64,
    /// Whether the solver converged
    pub converged: bool,
    pub elapsed: Duration,
}

impl fmt::Display for SolverInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solver: {} in {} iterations, residual = {:.2e}, elapsed = {:.3} ms",
            if self.converged {
                "converged"
            } else {
                "did not converge"
            },
            self.iterations,
            self.residual,
            self.elapsed.as_secs_f64() * 1e3
        )
    }
}

/// Approximate solution together with its convergence record
#[derive(Debug, Clone)]
pub struct Solution {
    pub x: DenseVector,
    pub info: SolverInfo,
}

/// Conjugate Gradient solver
///
/// # Examples
///
/// ```
/// use parla_core::{DenseMatrix, DenseVector, Vector};
/// use parla_exec::ThreadPool;
/// use parla_solve::{ConjugateGradient, SolverConfig};
///
/// let pool = ThreadPool::new(2).unwrap();
/// let a = DenseMatrix::from_rows(&[vec![4.0, 1.0], vec![1.0, 3.0]]).unwrap();
/// let b = DenseVector::from_vec(vec![1.0, 2.0]);
/// let x0 = DenseVector::zeros(2);
///
/// let solution = ConjugateGradient::new(SolverConfig::default())
///     .solve(&a, &b, &x0, &pool)
///     .unwrap();
/// assert!((solution.x.get(0) - 1.0 / 11.0).abs() < 1e-10);
/// assert!(solution.info.iterations <= 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConjugateGradient {
    config: SolverConfig,
}

impl ConjugateGradient {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve `A·x = b` from the initial guess `x0` on `pool`
    pub fn solve<M: Matrix>(
        &self,
        a: &M,
        b: &DenseVector,
        x0: &DenseVector,
        pool: &ThreadPool,
    ) -> SolveResult<Solution> {
        self.solve_with(a, b, x0, Dispatch::Pool(pool), &mut NoProgress)
    }

    /// As [`solve`](Self::solve), reporting every iteration to `progress`
    pub fn solve_with_progress<M, P>(
        &self,
        a: &M,
        b: &DenseVector,
        x0: &DenseVector,
        pool: &ThreadPool,
        progress: &mut P,
    ) -> SolveResult<Solution>
    where
        M: Matrix,
        P: ProgressReporter + ?Sized,
    {
        self.solve_with(a, b, x0, Dispatch::Pool(pool), progress)
    }

    /// Core iteration over an explicit [`Dispatch`]
    ///
    /// # Errors
    ///
    /// * `SolveError::InvalidConfig` for a non-positive tolerance
    /// * `LinalgError::DimensionMismatch` unless `A` is n×n and `b`, `x0`
    ///   have length n
    /// * `SolveError::ZeroDiagonal` when Jacobi is selected and `A` has a
    ///   zero on its diagonal
    /// * `SolveError::Breakdown` when a search direction has `dᵀA·d == 0`
    /// * `SolveError::NotConverged` once `max_iterations` is exceeded
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(n = a.nrows(), format = M::FORMAT, cores = dispatch.parallelism())
    )]
    pub fn solve_with<M, P>(
        &self,
        a: &M,
        b: &DenseVector,
        x0: &DenseVector,
        dispatch: Dispatch<'_>,
        progress: &mut P,
    ) -> SolveResult<Solution>
    where
        M: Matrix,
        P: ProgressReporter + ?Sized,
    {
        self.config.validate()?;
        check_system(a, b, x0)?;
        let preconditioner = self.config.preconditioner.build(a)?;
        let tolerance = self.config.tolerance;
        let active_cores = dispatch.parallelism();
        let start = Instant::now();

        let mut x = x0.clone();
        let mut r = b.sub_with(&a.mul_vec_with(&x, dispatch)?, dispatch)?;
        let mut residual = r.dot_with(&r, dispatch)?.sqrt();

        if residual < tolerance {
            tracing::debug!(residual, "initial guess already within tolerance");
            return Ok(Solution {
                x,
                info: SolverInfo {
                    iterations: 0,
                    residual,
                    converged: true,
                    elapsed: start.elapsed(),
                },
            });
        }

        let mut h = preconditioner.apply_with(&r, dispatch)?;
        let mut d = h.clone();
        let mut rh = r.dot_with(&h, dispatch)?;
        let mut iteration = 0usize;

        loop {
            if let Some(max) = self.config.max_iterations {
                if iteration >= max {
                    tracing::warn!(iteration, residual, "iteration cap reached");
                    return Err(SolveError::NotConverged {
                        iterations: iteration,
                        residual,
                    });
                }
            }

            let z = a.mul_vec_with(&d, dispatch)?;
            let curvature = d.dot_with(&z, dispatch)?;
            if curvature == 0.0 || !curvature.is_finite() {
                return Err(SolveError::Breakdown {
                    iteration: iteration + 1,
                });
            }
            let alpha = rh / curvature;

            x.self_axpy_with(alpha, &d, dispatch)?;
            r.self_axpy_with(-alpha, &z, dispatch)?;
            iteration += 1;
            residual = r.dot_with(&r, dispatch)?.sqrt();

            progress.report(&ProgressEvent {
                residual,
                iteration,
                elapsed: start.elapsed(),
                active_cores,
            });
            tracing::trace!(iteration, residual, alpha, "cg iteration");

            if residual < tolerance {
                break;
            }

            h = preconditioner.apply_with(&r, dispatch)?;
            let rh_new = r.dot_with(&h, dispatch)?;
            let beta = rh_new / rh;
            d.self_scale_with(beta, dispatch)?;
            d.self_add_with(&h, dispatch)?;
            rh = rh_new;
        }

        let info = SolverInfo {
            iterations: iteration,
            residual,
            converged: true,
            elapsed: start.elapsed(),
        };
        tracing::debug!(%info, "cg finished");
        Ok(Solution { x, info })
    }
}

fn check_system<M: Matrix>(a: &M, b: &DenseVector, x0: &DenseVector) -> SolveResult<()> {
    let n = a.nrows();
    if !a.is_square() {
        return Err(LinalgError::shape_mismatch("conjugate gradient", a.shape(), (n, n)).into());
    }
    if b.size() != n {
        return Err(LinalgError::length_mismatch("conjugate gradient rhs", n, b.size()).into());
    }
    if x0.size() != n {
        return Err(LinalgError::length_mismatch("conjugate gradient guess", n, x0.size()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreconditionerKind;
    use crate::progress::ProgressLog;
    use parla_core::generate::spd_matrix;
    use parla_core::DenseMatrix;
    use parla_sparse::{CsrMatrix, HashMatrix};

    fn small_system() -> (DenseMatrix, DenseVector) {
        let a = DenseMatrix::from_rows(&[vec![4.0, 1.0], vec![1.0, 3.0]]).unwrap();
        (a, DenseVector::from_vec(vec![1.0, 2.0]))
    }

    fn residual_norm<M: Matrix>(a: &M, x: &DenseVector, b: &DenseVector) -> f64 {
        a.mul_vec(x).unwrap().sub(b).unwrap().length()
    }

    #[test]
    fn test_two_by_two_converges_in_two_iterations() {
        let pool = ThreadPool::new(2).unwrap();
        let (a, b) = small_system();
        let solution = ConjugateGradient::default()
            .solve(&a, &b, &DenseVector::zeros(2), &pool)
            .unwrap();
        assert!(solution.info.converged);
        assert!(solution.info.iterations <= 2);
        assert!((solution.x.get(0) - 0.0909).abs() < 1e-4);
        assert!((solution.x.get(1) - 0.6364).abs() < 1e-4);
        assert!(residual_norm(&a, &solution.x, &b) < 1e-10);
    }

    #[test]
    fn test_exact_guess_returns_without_iterating() {
        let pool = ThreadPool::new(2).unwrap();
        let (a, b) = small_system();
        let x0 = DenseVector::from_vec(vec![1.0 / 11.0, 7.0 / 11.0]);
        let mut log = ProgressLog::new();
        let solution = ConjugateGradient::new(SolverConfig::default().with_tolerance(1e-12))
            .solve_with_progress(&a, &b, &x0, &pool, &mut log)
            .unwrap();
        assert_eq!(solution.info.iterations, 0);
        assert!(log.is_empty());
    }

    #[test]
    fn test_jacobi_on_sparse_representations() {
        let pool = ThreadPool::new(4).unwrap();
        let n = 120;
        let b = DenseVector::from_vec((0..n).map(|i| 1.0 + (i % 7) as f64).collect());
        let x0 = DenseVector::zeros(n);
        let config = SolverConfig::default()
            .with_tolerance(1e-10)
            .with_preconditioner(PreconditionerKind::Jacobi)
            .with_max_iterations(10 * n);
        let solver = ConjugateGradient::new(config);

        let csr: CsrMatrix = spd_matrix(n, 5);
        let from_csr = solver.solve(&csr, &b, &x0, &pool).unwrap();
        assert!(residual_norm(&csr, &from_csr.x, &b) < 1e-9);

        let hash: HashMatrix = spd_matrix(n, 5);
        let from_hash = solver.solve(&hash, &b, &x0, &pool).unwrap();
        assert!(from_hash.x.approx_eq(&from_csr.x, 1e-8));
    }

    #[test]
    fn test_progress_reported_every_iteration() {
        let pool = ThreadPool::new(3).unwrap();
        let n = 40;
        let a: DenseMatrix = spd_matrix(n, 2);
        let b = DenseVector::filled(n, 1.0);
        let mut log = ProgressLog::new();
        let solution = ConjugateGradient::new(
            SolverConfig::default()
                .with_tolerance(1e-10)
                .with_max_iterations(10 * n),
        )
        .solve_with_progress(&a, &b, &DenseVector::zeros(n), &pool, &mut log)
        .unwrap();

        assert_eq!(log.len(), solution.info.iterations);
        for (i, event) in log.events().iter().enumerate() {
            assert_eq!(event.iteration, i + 1);
            assert_eq!(event.active_cores, 3);
        }
        assert_eq!(log.last().map(|e| e.residual), Some(solution.info.residual));
    }

    #[test]
    fn test_sequential_matches_pool() {
        let pool = ThreadPool::new(4).unwrap();
        let n = 30;
        let a: CsrMatrix = spd_matrix(n, 8);
        let b = DenseVector::filled(n, 2.0);
        let x0 = DenseVector::zeros(n);
        let solver = ConjugateGradient::new(
            SolverConfig::default()
                .with_tolerance(1e-10)
                .with_max_iterations(10 * n),
        );
        let seq = solver
            .solve_with(&a, &b, &x0, Dispatch::Sequential, &mut NoProgress)
            .unwrap();
        let par = solver.solve(&a, &b, &x0, &pool).unwrap();
        assert!(seq.x.approx_eq(&par.x, 1e-8));
    }

    #[test]
    fn test_iteration_cap() {
        let pool = ThreadPool::new(2).unwrap();
        let a: DenseMatrix = spd_matrix(50, 1);
        let b = DenseVector::filled(50, 1.0);
        let result = ConjugateGradient::new(SolverConfig::default().with_max_iterations(1))
            .solve(&a, &b, &DenseVector::zeros(50), &pool);
        assert!(matches!(
            result,
            Err(SolveError::NotConverged { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_breakdown_on_zero_curvature() {
        let pool = ThreadPool::new(2).unwrap();
        let a = DenseMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let b = DenseVector::from_vec(vec![1.0, 0.0]);
        let result = ConjugateGradient::default().solve(&a, &b, &DenseVector::zeros(2), &pool);
        assert!(matches!(result, Err(SolveError::Breakdown { iteration: 1 })));
    }

    #[test]
    fn test_dimension_checks() {
        let pool = ThreadPool::new(2).unwrap();
        let (a, _) = small_system();
        let b = DenseVector::zeros(3);
        let result = ConjugateGradient::default().solve(&a, &b, &DenseVector::zeros(2), &pool);
        assert!(matches!(
            result,
            Err(SolveError::Linalg(LinalgError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_jacobi_zero_diagonal() {
        let pool = ThreadPool::new(2).unwrap();
        let a = DenseMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 2.0]]).unwrap();
        let config = SolverConfig::default().with_preconditioner(PreconditionerKind::Jacobi);
        let result = ConjugateGradient::new(config).solve(
            &a,
            &DenseVector::filled(2, 1.0),
            &DenseVector::zeros(2),
            &pool,
        );
        assert!(matches!(result, Err(SolveError::ZeroDiagonal { row: 0 })));
    }

    #[test]
    fn test_info_display() {
        let info = SolverInfo {
            iterations: 3,
            residual: 2.5e-15,
            converged: true,
            elapsed: Duration::from_micros(1500),
        };
        assert_eq!(
            info.to_string(),
            "Solver: converged in 3 iterations, residual = 2.50e-15, elapsed = 1.500 ms"
        );
    }
}
