//! Cholesky factorization `A = L·Lᵀ` for symmetric positive definite input

use parla_core::{LinalgError, Matrix};

use crate::error::{DecompError, DecompResult};

/// Lower-triangular Cholesky factor of `a`, in the representation of `a`
///
/// Only the lower triangle of `a` is read. The factorization runs on a dense
/// working copy; sparse inputs get their factor back through
/// [`Matrix::from_row_entries`], so fill-in is stored explicitly.
///
/// # Errors
///
/// * `LinalgError::DimensionMismatch` if `a` is not square
/// * `DecompError::NotPositiveDefinite` when a pivot is not strictly positive
///
/// # Examples
///
/// ```
/// use parla_core::{DenseMatrix, Matrix};
/// use parla_decomp::cholesky;
///
/// let a = DenseMatrix::from_rows(&[vec![4.0, 2.0], vec![2.0, 5.0]]).unwrap();
/// let l = cholesky(&a).unwrap();
/// assert_eq!(l.get(0, 0), 2.0);
/// assert_eq!(l.get(1, 0), 1.0);
/// assert_eq!(l.get(1, 1), 2.0);
/// assert_eq!(l.get(0, 1), 0.0);
/// ```
pub fn cholesky<M: Matrix>(a: &M) -> DecompResult<M> {
    let n = a.nrows();
    if !a.is_square() {
        return Err(LinalgError::shape_mismatch("cholesky", a.shape(), (n, n)).into());
    }

    let dense = a.to_dense();
    // Row-major lower triangle; row i holds L[i, 0..=i].
    let mut l: Vec<Vec<f64>> = Vec::with_capacity(n);

    for i in 0..n {
        let mut row = vec![0.0; i + 1];
        for j in 0..=i {
            let partial: f64 = (0..j).map(|k| row[k] * l_at(&l, j, k, &row)).sum();
            let value = dense.get(i, j) - partial;
            if i == j {
                if value <= 0.0 || value.is_nan() {
                    return Err(DecompError::NotPositiveDefinite { row: i, pivot: value });
                }
                row[j] = value.sqrt();
            } else {
                row[j] = value / l[j][j];
            }
        }
        l.push(row);
    }

    tracing::trace!(n, format = M::FORMAT, "cholesky factorization complete");

    let entries = l
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .filter(|&(_, v)| v != 0.0)
                .collect()
        })
        .collect();
    Ok(M::from_row_entries(n, n, entries))
}

/// `L[j, k]` for `j <= i`, reading the row under construction when `j == i`
#[inline]
fn l_at(l: &[Vec<f64>], j: usize, k: usize, current: &[f64]) -> f64 {
    if j < l.len() {
        l[j][k]
    } else {
        current[k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parla_core::generate::spd_matrix;
    use parla_core::DenseMatrix;
    use parla_sparse::{CsrMatrix, HashMatrix};

    #[test]
    fn test_reconstructs_spd_matrix() {
        let a: DenseMatrix = spd_matrix(8, 3);
        let l = cholesky(&a).unwrap();
        let llt = l.mul_mat(&l.transpose().unwrap()).unwrap();
        for (x, y) in llt.as_slice().iter().zip(a.as_slice()) {
            assert!((x - y).abs() < 1e-10, "{x} vs {y}");
        }
        for i in 0..8 {
            assert!(l.get(i, i) > 0.0);
            for j in i + 1..8 {
                assert_eq!(l.get(i, j), 0.0);
            }
        }
    }

    #[test]
    fn test_sparse_factor_matches_dense() {
        let a: DenseMatrix = spd_matrix(6, 11);
        let dense = cholesky(&a).unwrap();
        let csr = cholesky(&CsrMatrix::from_dense(&a)).unwrap();
        let hash = cholesky(&HashMatrix::from_dense(&a)).unwrap();
        assert_eq!(csr.to_dense(), dense);
        assert_eq!(hash.to_dense(), dense);
    }

    #[test]
    fn test_identity_is_its_own_factor() {
        let eye = CsrMatrix::from_dense(&DenseMatrix::identity(4));
        let l = cholesky(&eye).unwrap();
        assert_eq!(l.nnz(), 4);
        assert_eq!(l.to_dense(), DenseMatrix::identity(4));
    }

    #[test]
    fn test_rejects_indefinite() {
        let a = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 1.0]]).unwrap();
        assert!(matches!(
            cholesky(&a),
            Err(DecompError::NotPositiveDefinite { row: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_non_square() {
        let a = DenseMatrix::zeros(2, 3);
        assert!(matches!(
            cholesky(&a),
            Err(DecompError::LinalgError(LinalgError::DimensionMismatch { .. }))
        ));
    }
}
