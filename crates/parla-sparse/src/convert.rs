//! Conversions between Dense, CSR and hash-of-rows storage
//!
//! Every conversion copies the nonzero entries row by row, so values are
//! reproduced exactly in any direction.

use parla_core::{DenseMatrix, LinalgResult, Matrix};
use parla_exec::{Dispatch, ThreadPool};

use crate::csr::CsrMatrix;
use crate::hash::HashMatrix;

/// Copy `src` into representation `T`, one row per unit of work
pub fn convert_with<S: Matrix, T: Matrix>(src: &S, dispatch: Dispatch<'_>) -> LinalgResult<T> {
    let rows = dispatch.map_collect(src.nrows(), |row| src.row_entries(row))?;
    Ok(T::from_row_entries(src.nrows(), src.ncols(), rows))
}

/// Copy `src` into representation `T` on the calling thread
///
/// # Examples
///
/// ```
/// use parla_core::{DenseMatrix, Matrix};
/// use parla_sparse::{convert, CsrMatrix};
///
/// let dense = DenseMatrix::from_rows(&[vec![0.0, 1.5], vec![2.0, 0.0]]).unwrap();
/// let csr: CsrMatrix = convert(&dense);
/// assert_eq!(csr.nnz(), 2);
/// assert_eq!(csr.to_dense(), dense);
/// ```
pub fn convert<S: Matrix, T: Matrix>(src: &S) -> T {
    let rows = (0..src.nrows()).map(|row| src.row_entries(row)).collect();
    T::from_row_entries(src.nrows(), src.ncols(), rows)
}

/// Copy `src` into representation `T` across a pool
pub fn par_convert<S: Matrix, T: Matrix>(src: &S, pool: &ThreadPool) -> LinalgResult<T> {
    convert_with(src, Dispatch::Pool(pool))
}

impl CsrMatrix {
    pub fn from_dense(dense: &DenseMatrix) -> Self {
        convert(dense)
    }

    pub fn from_hash(hash: &HashMatrix) -> Self {
        convert(hash)
    }

    pub fn to_hash(&self) -> HashMatrix {
        convert(self)
    }
}

impl HashMatrix {
    pub fn from_dense(dense: &DenseMatrix) -> Self {
        convert(dense)
    }

    pub fn from_csr(csr: &CsrMatrix) -> Self {
        convert(csr)
    }

    pub fn to_csr(&self) -> CsrMatrix {
        convert(self)
    }
}

impl From<&DenseMatrix> for CsrMatrix {
    fn from(dense: &DenseMatrix) -> Self {
        convert(dense)
    }
}

impl From<&HashMatrix> for CsrMatrix {
    fn from(hash: &HashMatrix) -> Self {
        convert(hash)
    }
}

impl From<&DenseMatrix> for HashMatrix {
    fn from(dense: &DenseMatrix) -> Self {
        convert(dense)
    }
}

impl From<&CsrMatrix> for HashMatrix {
    fn from(csr: &CsrMatrix) -> Self {
        convert(csr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense() -> DenseMatrix {
        DenseMatrix::from_rows(&[
            vec![0.0, 1.0, 0.0, 2.0],
            vec![0.0, 0.0, 0.0, 0.0],
            vec![3.0, 0.0, -4.5, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_dense_csr_dense() {
        let d = dense();
        let csr = CsrMatrix::from_dense(&d);
        assert_eq!(csr.row_ptr(), &[0, 2, 2, 4]);
        assert_eq!(csr.to_dense(), d);
    }

    #[test]
    fn test_dense_hash_csr() {
        let d = dense();
        let hash = HashMatrix::from_dense(&d);
        assert_eq!(hash.storage_size(), 4);
        let csr = hash.to_csr();
        assert_eq!(csr, CsrMatrix::from_dense(&d));
        assert_eq!(HashMatrix::from(&csr), hash);
    }

    #[test]
    fn test_parallel_conversion() {
        let pool = ThreadPool::new(3).unwrap();
        let d = dense();
        let csr: CsrMatrix = par_convert(&d, &pool).unwrap();
        assert_eq!(csr, CsrMatrix::from(&d));
        let back: DenseMatrix = par_convert(&csr, &pool).unwrap();
        assert_eq!(back, d);
    }
}
