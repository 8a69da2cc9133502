//! Preconditioners for Conjugate Gradient
//!
//! A preconditioner approximates `A⁻¹` cheaply: `apply_with(r)` returns
//! `z = M⁻¹·r`. Everything here is elementwise, so it partitions over the pool
//! exactly like the vector kernels do.

use parla_core::{DenseVector, LinalgError, Matrix, Vector};
use parla_exec::Dispatch;

use crate::config::PreconditionerKind;
use crate::error::{SolveError, SolveResult};

/// Approximate inverse applied once per solver iteration
pub trait Preconditioner: Send + Sync {
    /// `z = M⁻¹·r`
    fn apply_with(&self, r: &DenseVector, dispatch: Dispatch<'_>) -> SolveResult<DenseVector>;

    fn apply(&self, r: &DenseVector) -> SolveResult<DenseVector> {
        self.apply_with(r, Dispatch::Sequential)
    }
}

/// Identity preconditioner (no preconditioning)
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPreconditioner;

impl Preconditioner for IdentityPreconditioner {
    fn apply_with(&self, r: &DenseVector, _dispatch: Dispatch<'_>) -> SolveResult<DenseVector> {
        Ok(r.clone())
    }
}

/// Jacobi (diagonal) preconditioner
///
/// Stores `C = 1 / diag(A)` and applies it as the elementwise product `C ⊙ r`.
///
/// # Examples
///
/// ```
/// use parla_core::{DenseMatrix, DenseVector, Vector};
/// use parla_solve::{JacobiPreconditioner, Preconditioner};
///
/// let a = DenseMatrix::from_rows(&[vec![4.0, -1.0], vec![-1.0, 2.0]]).unwrap();
/// let jacobi = JacobiPreconditioner::from_matrix(&a).unwrap();
/// let z = jacobi.apply(&DenseVector::from_vec(vec![1.0, 2.0])).unwrap();
/// assert_eq!(z.as_slice(), &[0.25, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct JacobiPreconditioner {
    inverse_diagonal: DenseVector,
}

impl JacobiPreconditioner {
    /// Build from the diagonal of a square matrix
    ///
    /// Fails with [`SolveError::ZeroDiagonal`] on the first zero (or
    /// missing, for sparse storage) diagonal entry.
    pub fn from_matrix<M: Matrix>(a: &M) -> SolveResult<Self> {
        if !a.is_square() {
            let n = a.nrows();
            return Err(
                LinalgError::shape_mismatch("jacobi preconditioner", a.shape(), (n, n)).into(),
            );
        }
        let diagonal = a.diagonal();
        let mut inverse = Vec::with_capacity(diagonal.size());
        for (row, &value) in diagonal.iter().enumerate() {
            if value == 0.0 {
                return Err(SolveError::ZeroDiagonal { row });
            }
            inverse.push(1.0 / value);
        }
        Ok(Self {
            inverse_diagonal: DenseVector::from_vec(inverse),
        })
    }

    /// The stored `1 / diag(A)`
    pub fn inverse_diagonal(&self) -> &DenseVector {
        &self.inverse_diagonal
    }
}

impl Preconditioner for JacobiPreconditioner {
    fn apply_with(&self, r: &DenseVector, dispatch: Dispatch<'_>) -> SolveResult<DenseVector> {
        Ok(r.hadamard_with(&self.inverse_diagonal, dispatch)?)
    }
}

impl PreconditionerKind {
    /// Construct the selected preconditioner for `a`
    pub fn build<M: Matrix>(self, a: &M) -> SolveResult<Box<dyn Preconditioner>> {
        Ok(match self {
            PreconditionerKind::None => Box::new(IdentityPreconditioner),
            PreconditionerKind::Jacobi => Box::new(JacobiPreconditioner::from_matrix(a)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parla_core::DenseMatrix;
    use parla_exec::ThreadPool;
    use parla_sparse::CsrMatrix;

    #[test]
    fn test_jacobi_inverse_diagonal() {
        let a = DenseMatrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 8.0]]).unwrap();
        let jacobi = JacobiPreconditioner::from_matrix(&a).unwrap();
        assert_eq!(jacobi.inverse_diagonal().as_slice(), &[0.5, 0.125]);
    }

    #[test]
    fn test_jacobi_parallel_matches_sequential() {
        let pool = ThreadPool::new(3).unwrap();
        let n = 37;
        let mut a = DenseMatrix::identity(n);
        for i in 0..n {
            a.set(i, i, 1.0 + i as f64);
        }
        let jacobi = JacobiPreconditioner::from_matrix(&a).unwrap();
        let r = DenseVector::from_vec((0..n).map(|i| (i as f64).sqrt()).collect());
        let seq = jacobi.apply(&r).unwrap();
        let par = jacobi.apply_with(&r, Dispatch::Pool(&pool)).unwrap();
        assert_eq!(seq, par);
        assert!((seq.get(4) - 2.0 / 5.0).abs() < 1e-15);
    }

    #[test]
    fn test_missing_sparse_diagonal() {
        let mut a = CsrMatrix::zeros(3, 3);
        a.set(0, 0, 1.0);
        a.set(1, 2, 1.0);
        a.set(2, 2, 1.0);
        assert!(matches!(
            JacobiPreconditioner::from_matrix(&a),
            Err(SolveError::ZeroDiagonal { row: 1 })
        ));
    }

    #[test]
    fn test_kind_builds_identity() {
        let a = DenseMatrix::identity(2);
        let p = PreconditionerKind::None.build(&a).unwrap();
        let r = DenseVector::from_vec(vec![3.0, -4.0]);
        assert_eq!(p.apply(&r).unwrap(), r);
    }
}
