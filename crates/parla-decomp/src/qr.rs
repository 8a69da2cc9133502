//! QR decomposition by Givens rotations
//!
//! R starts as a copy of the input and Q as the identity. Each nonzero
//! sub-diagonal entry `R[i, n]` is eliminated by a rotation of rows `n` and
//! `i`; the transposed rotation is accumulated into columns `n` and `i` of Q
//! so that `A = Q·R` holds after every step.

use parla_core::{DenseMatrix, Matrix};

/// Orthogonal and upper-triangular factors of `A = Q·R`
#[derive(Debug, Clone)]
pub struct QrDecomposition {
    /// M×M orthogonal factor
    pub q: DenseMatrix,
    /// M×N upper-triangular factor
    pub r: DenseMatrix,
}

impl QrDecomposition {
    /// Product of R's diagonal
    ///
    /// Every rotation has determinant one, so for square input this is the
    /// determinant of A.
    pub fn diagonal_product(&self) -> f64 {
        (0..self.r.nrows().min(self.r.ncols()))
            .map(|i| self.r.get(i, i))
            .product()
    }
}

/// Rotation `(c, s)` zeroing `v2` against `v1`
///
/// Applied to a pair `(a, b)` as `(c·a − s·b, s·a + c·b)`, it maps
/// `(v1, v2)` to `(r, 0)` with `r = √(v1² + v2²)`.
#[inline]
fn givens(v1: f64, v2: f64) -> (f64, f64, f64) {
    let r = v1.hypot(v2);
    (v1 / r, -v2 / r, r)
}

/// Factor any M×N matrix with Givens rotations
///
/// Zero sub-diagonal entries are skipped, so already-triangular input costs
/// only the scan.
///
/// # Examples
///
/// ```
/// use parla_core::{DenseMatrix, Matrix};
/// use parla_decomp::qr_givens;
///
/// let a = DenseMatrix::from_rows(&[vec![3.0, 1.0], vec![4.0, 2.0]]).unwrap();
/// let qr = qr_givens(&a);
/// assert!(qr.r.get(1, 0).abs() < 1e-15);
/// assert!((qr.diagonal_product() - 2.0).abs() < 1e-12);
/// ```
pub fn qr_givens<M: Matrix>(a: &M) -> QrDecomposition {
    let (m, n_cols) = a.shape();
    let mut r = a.to_dense();
    let mut q = DenseMatrix::identity(m);
    let mut rotations = 0usize;

    for i in 1..m {
        for n in 0..i.min(n_cols) {
            let v2 = r.get(i, n);
            if v2 == 0.0 {
                continue;
            }
            let (c, s, norm) = givens(r.get(n, n), v2);
            rotations += 1;

            r.set(i, n, 0.0);
            r.set(n, n, norm);
            for k in n + 1..n_cols {
                let (a_nk, a_ik) = (r.get(n, k), r.get(i, k));
                r.set(n, k, c * a_nk - s * a_ik);
                r.set(i, k, s * a_nk + c * a_ik);
            }

            for k in 0..m {
                let (q_kn, q_ki) = (q.get(k, n), q.get(k, i));
                q.set(k, n, c * q_kn - s * q_ki);
                q.set(k, i, s * q_kn + c * q_ki);
            }
        }
    }

    tracing::trace!(rows = m, cols = n_cols, rotations, "givens QR complete");
    QrDecomposition { q, r }
}

/// Determinant of any [`Matrix`] through its Givens QR factorization
pub trait Determinant {
    /// Product of R's diagonal; 0 for non-square input
    fn determinant(&self) -> f64;
}

impl<M: Matrix> Determinant for M {
    fn determinant(&self) -> f64 {
        if !self.is_square() {
            return 0.0;
        }
        qr_givens(self).diagonal_product()
    }
}
