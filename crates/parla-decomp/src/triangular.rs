//! Triangular solves over any [`Matrix`] representation
//!
//! Rows are walked through [`Matrix::for_each_in_row`], so sparse factors only
//! touch their stored entries. Entries on the wrong side of the diagonal are
//! ignored rather than rejected.

use parla_core::{DenseVector, LinalgError, Matrix, Vector};

use crate::cholesky::cholesky;
use crate::error::{DecompError, DecompResult};

fn check_system<M: Matrix>(a: &M, b: &DenseVector, operation: &'static str) -> DecompResult<()> {
    let n = a.nrows();
    if !a.is_square() {
        return Err(LinalgError::shape_mismatch(operation, a.shape(), (n, n)).into());
    }
    if b.size() != n {
        return Err(LinalgError::length_mismatch(operation, n, b.size()).into());
    }
    Ok(())
}

/// Split row `i` into its diagonal entry and `Σ_{j in cols} a[i, j]·x[j]`
fn row_terms<M, P>(l: &M, i: usize, x: &[f64], keep: P) -> DecompResult<(f64, f64)>
where
    M: Matrix,
    P: Fn(usize) -> bool,
{
    let mut diag = 0.0;
    let mut sum = 0.0;
    l.for_each_in_row(i, |j, v| {
        if j == i {
            diag = v;
        } else if keep(j) {
            sum += v * x[j];
        }
    });
    if diag == 0.0 {
        return Err(DecompError::Singular { row: i });
    }
    Ok((diag, sum))
}

/// Solve `L·x = b` by forward substitution
pub fn solve_lower_triangular<M: Matrix>(l: &M, b: &DenseVector) -> DecompResult<DenseVector> {
    check_system(l, b, "lower triangular solve")?;
    let mut x = vec![0.0; b.size()];
    for i in 0..x.len() {
        let (diag, sum) = row_terms(l, i, &x, |j| j < i)?;
        x[i] = (b.get(i) - sum) / diag;
    }
    Ok(DenseVector::from_vec(x))
}

/// Solve `U·x = b` by backward substitution
pub fn solve_upper_triangular<M: Matrix>(u: &M, b: &DenseVector) -> DecompResult<DenseVector> {
    check_system(u, b, "upper triangular solve")?;
    let mut x = vec![0.0; b.size()];
    for i in (0..x.len()).rev() {
        let (diag, sum) = row_terms(u, i, &x, |j| j > i)?;
        x[i] = (b.get(i) - sum) / diag;
    }
    Ok(DenseVector::from_vec(x))
}

/// Solve `Lᵀ·x = b` without materializing the transpose
///
/// Column-oriented backward substitution: once `x[i]` is known, row `i` of
/// `L` is scattered into the remaining right-hand side.
pub fn solve_lower_transposed<M: Matrix>(l: &M, b: &DenseVector) -> DecompResult<DenseVector> {
    check_system(l, b, "transposed lower triangular solve")?;
    let mut rhs = b.as_slice().to_vec();
    let mut x = vec![0.0; rhs.len()];
    for i in (0..x.len()).rev() {
        let diag = l.get(i, i);
        if diag == 0.0 {
            return Err(DecompError::Singular { row: i });
        }
        x[i] = rhs[i] / diag;
        let xi = x[i];
        l.for_each_in_row(i, |j, v| {
            if j < i {
                rhs[j] -= v * xi;
            }
        });
    }
    Ok(DenseVector::from_vec(x))
}

/// Solve `A·x = b` for symmetric positive definite `A` via `L·Lᵀ`
///
/// # Examples
///
/// ```
/// use parla_core::{DenseMatrix, DenseVector, Vector};
/// use parla_decomp::cholesky_solve;
///
/// let a = DenseMatrix::from_rows(&[vec![4.0, 1.0], vec![1.0, 3.0]]).unwrap();
/// let b = DenseVector::from_vec(vec![1.0, 2.0]);
/// let x = cholesky_solve(&a, &b).unwrap();
/// assert!((x.get(0) - 1.0 / 11.0).abs() < 1e-12);
/// assert!((x.get(1) - 7.0 / 11.0).abs() < 1e-12);
/// ```
pub fn cholesky_solve<M: Matrix>(a: &M, b: &DenseVector) -> DecompResult<DenseVector> {
    check_system(a, b, "cholesky solve")?;
    let l = cholesky(a)?;
    let y = solve_lower_triangular(&l, b)?;
    solve_lower_transposed(&l, &y)
}
