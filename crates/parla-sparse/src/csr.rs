//! CSR (Compressed Sparse Row) matrix
//!
//! # Format
//!
//! For an m×n sparse matrix with nnz non-zeros:
//! - `row_ptr`: length m+1, `row_ptr[i]` is the start of row i, `row_ptr[m] = nnz`
//! - `col_indices`: length nnz, strictly increasing within each row
//! - `values`: length nnz, never exactly zero
//!
//! # Examples
//!
//! ```
//! use parla_core::Matrix;
//! use parla_sparse::CsrMatrix;
//!
//! // [1.0  0   2.0  0  ]
//! // [0    3.0 0    0  ]
//! // [4.0  0   0    5.0]
//! let row_ptr = vec![0, 2, 3, 5];
//! let col_indices = vec![0, 2, 1, 0, 3];
//! let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
//!
//! let csr = CsrMatrix::new(row_ptr, col_indices, values, (3, 4)).unwrap();
//! assert_eq!(csr.nnz(), 5);
//! assert_eq!(csr.get(2, 3), 5.0);
//! assert_eq!(csr.get(1, 0), 0.0);
//! ```

use parla_core::{LinalgError, LinalgResult, Matrix};
use parla_exec::Dispatch;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrError {
    #[error("Invalid row pointers: length {len} for {nrows} rows (expected {expected})")]
    InvalidRowPtr {
        len: usize,
        nrows: usize,
        expected: usize,
    },

    #[error("Row pointer not sorted at index {idx}: {curr} > {next}")]
    RowPtrNotSorted {
        idx: usize,
        curr: usize,
        next: usize,
    },

    #[error("Length mismatch: {col_indices} col_indices but {values} values")]
    LengthMismatch { col_indices: usize, values: usize },

    #[error("Column index out of bounds: {col_idx} >= {ncols}")]
    ColIndexOutOfBounds { col_idx: usize, ncols: usize },

    #[error("Column indices of row {row} are not strictly increasing")]
    ColIndicesNotSorted { row: usize },

    #[error("Explicit zero stored at row {row}, column {col}")]
    ExplicitZero { row: usize, col: usize },

    #[error("Row pointers end at {row_ptr_end} but {nnz} entries are stored")]
    NnzMismatch { row_ptr_end: usize, nnz: usize },
}

impl From<CsrError> for LinalgError {
    fn from(err: CsrError) -> Self {
        LinalgError::invalid_structure(err.to_string())
    }
}

/// CSR (Compressed Sparse Row) matrix of `f64`
///
/// Row operations only visit a row's stored span. Inserting a new nonzero
/// shifts every later row start by one, so building a matrix through
/// [`Matrix::set`] costs O(nnz) per foreign insert.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CsrMatrix {
    /// Row pointers: row_ptr[i] = start index of row i in col_indices/values
    row_ptr: Vec<usize>,

    /// Column indices for each non-zero element
    col_indices: Vec<usize>,

    /// Values of non-zero elements
    values: Vec<f64>,

    /// Shape: (nrows, ncols)
    shape: (usize, usize),
}

impl CsrMatrix {
    /// Create a new CSR matrix from raw arrays
    ///
    /// # Arguments
    ///
    /// * `row_ptr` - Row pointers (length nrows+1)
    /// * `col_indices` - Column indices for each non-zero
    /// * `values` - Values for each non-zero
    /// * `shape` - (nrows, ncols)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - row_ptr length is incorrect or does not end at nnz
    /// - col_indices and values have different lengths
    /// - row_ptr is not monotonically non-decreasing
    /// - any column index is out of bounds or not strictly increasing in its row
    /// - a stored value is exactly zero
    pub fn new(
        row_ptr: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<f64>,
        shape: (usize, usize),
    ) -> Result<Self, CsrError> {
        Self::validate(&row_ptr, &col_indices, &values, shape)
            .inspect_err(|err| tracing::debug!(%err, ?shape, "rejected CSR arrays"))?;

        Ok(Self {
            row_ptr,
            col_indices,
            values,
            shape,
        })
    }

    fn validate(
        row_ptr: &[usize],
        col_indices: &[usize],
        values: &[f64],
        shape: (usize, usize),
    ) -> Result<(), CsrError> {
        let (nrows, ncols) = shape;

        if row_ptr.len() != nrows + 1 || row_ptr[0] != 0 {
            return Err(CsrError::InvalidRowPtr {
                len: row_ptr.len(),
                nrows,
                expected: nrows + 1,
            });
        }

        if col_indices.len() != values.len() {
            return Err(CsrError::LengthMismatch {
                col_indices: col_indices.len(),
                values: values.len(),
            });
        }

        for i in 0..nrows {
            if row_ptr[i] > row_ptr[i + 1] {
                return Err(CsrError::RowPtrNotSorted {
                    idx: i,
                    curr: row_ptr[i],
                    next: row_ptr[i + 1],
                });
            }
        }

        let nnz = col_indices.len();
        if row_ptr[nrows] != nnz {
            return Err(CsrError::NnzMismatch {
                row_ptr_end: row_ptr[nrows],
                nnz,
            });
        }

        for row in 0..nrows {
            let span = row_ptr[row]..row_ptr[row + 1];
            let cols = &col_indices[span.clone()];
            if let Some(&col_idx) = cols.iter().find(|&&c| c >= ncols) {
                return Err(CsrError::ColIndexOutOfBounds { col_idx, ncols });
            }
            if cols.windows(2).any(|w| w[0] >= w[1]) {
                return Err(CsrError::ColIndicesNotSorted { row });
            }
            if let Some(k) = values[span.clone()].iter().position(|&v| v == 0.0) {
                return Err(CsrError::ExplicitZero {
                    row,
                    col: cols[k],
                });
            }
        }

        Ok(())
    }

    /// Number of stored non-zeros
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Fraction of cells that are stored
    pub fn density(&self) -> f64 {
        let cells = self.shape.0 * self.shape.1;
        if cells == 0 {
            0.0
        } else {
            self.nnz() as f64 / cells as f64
        }
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column indices and values of row `i`
    pub fn row(&self, i: usize) -> Option<(&[usize], &[f64])> {
        if i >= self.shape.0 {
            return None;
        }
        let span = self.row_ptr[i]..self.row_ptr[i + 1];
        Some((&self.col_indices[span.clone()], &self.values[span]))
    }

    /// Storage position of `(row, col)`, or where it would be inserted
    fn locate(&self, row: usize, col: usize) -> Result<usize, usize> {
        assert!(
            row < self.shape.0 && col < self.shape.1,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.shape.0,
            self.shape.1
        );
        let start = self.row_ptr[row];
        let cols = &self.col_indices[start..self.row_ptr[row + 1]];
        cols.binary_search(&col)
            .map(|k| start + k)
            .map_err(|k| start + k)
    }

    /// Drop entries that became exactly zero, e.g. through underflow
    fn prune_zeros(&mut self) {
        if !self.values.contains(&0.0) {
            return;
        }
        let mut kept = 0;
        let mut start = 0;
        for row in 0..self.shape.0 {
            let end = self.row_ptr[row + 1];
            for k in start..end {
                if self.values[k] != 0.0 {
                    self.values[kept] = self.values[k];
                    self.col_indices[kept] = self.col_indices[k];
                    kept += 1;
                }
            }
            start = end;
            self.row_ptr[row + 1] = kept;
        }
        tracing::trace!(dropped = self.values.len() - kept, "pruned zero entries");
        self.values.truncate(kept);
        self.col_indices.truncate(kept);
    }
}

impl Matrix for CsrMatrix {
    const FORMAT: &'static str = "csr";

    fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            row_ptr: vec![0; nrows + 1],
            col_indices: Vec::new(),
            values: Vec::new(),
            shape: (nrows, ncols),
        }
    }

    fn from_row_entries(nrows: usize, ncols: usize, rows: Vec<Vec<(usize, f64)>>) -> Self {
        let nnz = rows.iter().take(nrows).map(Vec::len).sum();
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_indices = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);

        row_ptr.push(0);
        for entries in rows.into_iter().take(nrows) {
            for (col, value) in entries {
                if value != 0.0 {
                    col_indices.push(col);
                    values.push(value);
                }
            }
            row_ptr.push(values.len());
        }
        row_ptr.resize(nrows + 1, values.len());

        Self {
            row_ptr,
            col_indices,
            values,
            shape: (nrows, ncols),
        }
    }

    fn nrows(&self) -> usize {
        self.shape.0
    }

    fn ncols(&self) -> usize {
        self.shape.1
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        match self.locate(row, col) {
            Ok(k) => self.values[k],
            Err(_) => 0.0,
        }
    }

    /// Store `value` at `(row, col)`
    ///
    /// A new nonzero is inserted in column order and every later row start
    /// moves by one. Writing zero removes a stored entry.
    fn set(&mut self, row: usize, col: usize, value: f64) {
        match self.locate(row, col) {
            Ok(k) if value == 0.0 => {
                self.values.remove(k);
                self.col_indices.remove(k);
                self.row_ptr[row + 1..].iter_mut().for_each(|p| *p -= 1);
            }
            Ok(k) => self.values[k] = value,
            Err(_) if value == 0.0 => {}
            Err(k) => {
                self.values.insert(k, value);
                self.col_indices.insert(k, col);
                self.row_ptr[row + 1..].iter_mut().for_each(|p| *p += 1);
            }
        }
    }

    fn storage_size(&self) -> usize {
        self.nnz()
    }

    fn for_each_in_row<F: FnMut(usize, f64)>(&self, row: usize, mut f: F) {
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        for (&col, &value) in self.col_indices[span.clone()].iter().zip(&self.values[span]) {
            f(col, value);
        }
    }

    fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        let mut entries = Vec::with_capacity(self.row_ptr[row + 1] - self.row_ptr[row]);
        self.for_each_in_row(row, |col, value| entries.push((col, value)));
        entries
    }

    fn self_add_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        *self = self.merge_with(other, "matrix add", dispatch, |a, b| a + b)?;
        Ok(())
    }

    fn self_sub_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        *self = self.merge_with(other, "matrix sub", dispatch, |a, b| a - b)?;
        Ok(())
    }

    /// Scale stored values in place, one row span per unit of work
    fn self_scale_with(&mut self, factor: f64, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        if factor == 0.0 {
            *self = Self::zeros(self.shape.0, self.shape.1);
            return Ok(());
        }
        dispatch.for_each_span_mut(&mut self.values, &self.row_ptr, |_, span| {
            span.iter_mut().for_each(|v| *v *= factor);
        })?;
        self.prune_zeros();
        Ok(())
    }

    fn scale_row(&mut self, row: usize, factor: f64) {
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        self.values[span].iter_mut().for_each(|v| *v *= factor);
        self.prune_zeros();
    }

    /// Linear scan over stored entries; zero is present in any non-full matrix
    fn has_value(&self, value: f64) -> LinalgResult<bool> {
        if value == 0.0 {
            return Ok(self.nnz() < self.shape.0 * self.shape.1);
        }
        Ok(self.values.contains(&value))
    }

    /// Replace stored entries equal to `old`; implicit zeros are never touched
    fn replace_value(&mut self, old: f64, new: f64) -> LinalgResult<usize> {
        let mut count = 0;
        for v in self.values.iter_mut().filter(|v| **v == old) {
            *v = new;
            count += 1;
        }
        self.prune_zeros();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parla_core::{DenseVector, Vector};
    use parla_exec::ThreadPool;

    fn sample() -> CsrMatrix {
        let mut m = CsrMatrix::zeros(4, 5);
        for &(r, c, v) in &[
            (1, 2, 11.0),
            (0, 0, 10.0),
            (0, 3, 12.0),
            (1, 4, 13.0),
            (2, 1, 16.0),
            (3, 2, 11.0),
            (3, 4, 13.0),
        ] {
            m.set(r, c, v);
        }
        m
    }

    #[test]
    fn test_insertion_order() {
        let m = sample();
        assert_eq!(m.row_ptr(), &[0, 2, 4, 5, 7]);
        assert_eq!(m.col_indices(), &[0, 3, 2, 4, 1, 2, 4]);
        assert_eq!(m.values(), &[10.0, 12.0, 11.0, 13.0, 16.0, 11.0, 13.0]);
        assert_eq!(m.storage_size(), 7);
    }

    #[test]
    fn test_get_unset_is_zero() {
        let m = sample();
        assert_eq!(m.get(0, 1), 0.0);
        assert_eq!(m.get(3, 4), 13.0);
    }

    #[test]
    fn test_set_zero_removes_entry() {
        let mut m = sample();
        m.set(1, 2, 0.0);
        assert_eq!(m.row_ptr(), &[0, 2, 3, 4, 6]);
        assert_eq!(m.nnz(), 6);
        m.set(0, 1, 0.0);
        assert_eq!(m.nnz(), 6);
    }

    #[test]
    fn test_overwrite_keeps_structure() {
        let mut m = sample();
        m.set(2, 1, -1.0);
        assert_eq!(m.row_ptr(), &[0, 2, 4, 5, 7]);
        assert_eq!(m.get(2, 1), -1.0);
    }

    #[test]
    fn test_new_validation() {
        assert!(matches!(
            CsrMatrix::new(vec![0, 1], vec![0], vec![1.0], (2, 2)),
            Err(CsrError::InvalidRowPtr { .. })
        ));
        assert!(matches!(
            CsrMatrix::new(vec![0, 2, 2], vec![1, 0], vec![1.0, 2.0], (2, 2)),
            Err(CsrError::ColIndicesNotSorted { row: 0 })
        ));
        assert!(matches!(
            CsrMatrix::new(vec![0, 1, 1], vec![5], vec![1.0], (2, 2)),
            Err(CsrError::ColIndexOutOfBounds { col_idx: 5, ncols: 2 })
        ));
        assert!(matches!(
            CsrMatrix::new(vec![0, 1, 1], vec![0], vec![0.0], (2, 2)),
            Err(CsrError::ExplicitZero { row: 0, col: 0 })
        ));
        assert!(matches!(
            CsrMatrix::new(vec![0, 1, 1], vec![0], vec![1.0, 2.0], (2, 2)),
            Err(CsrError::LengthMismatch { .. })
        ));
        assert!(matches!(
            CsrMatrix::new(vec![0, 1, 3], vec![0], vec![1.0], (2, 2)),
            Err(CsrError::NnzMismatch {
                row_ptr_end: 3,
                nnz: 1
            })
        ));
    }

    #[test]
    fn test_row_accessor() {
        let m = sample();
        let (cols, vals) = m.row(1).unwrap();
        assert_eq!(cols, &[2, 4]);
        assert_eq!(vals, &[11.0, 13.0]);
        assert!(m.row(4).is_none());
    }

    #[test]
    fn test_add_sub_parallel() {
        let pool = ThreadPool::new(3).unwrap();
        let a = sample();
        let b = sample();
        let sum = a.par_add(&b, &pool).unwrap();
        assert_eq!(sum.get(3, 2), 22.0);
        assert_eq!(sum.row_ptr(), a.row_ptr());
        assert_eq!(sum, a.add(&b).unwrap());

        // Cancellation removes entries instead of storing zeros
        let diff = a.par_sub(&b, &pool).unwrap();
        assert_eq!(diff.nnz(), 0);
        assert_eq!(diff.row_ptr(), &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_scale_in_place() {
        let pool = ThreadPool::new(2).unwrap();
        let mut m = sample();
        m.par_self_scale(0.5, &pool).unwrap();
        assert_eq!(m.get(0, 0), 5.0);
        assert_eq!(m.nnz(), 7);
        m.self_scale(0.0).unwrap();
        assert_eq!(m.nnz(), 0);
    }

    #[test]
    fn test_scale_prunes_underflow() {
        let mut m = CsrMatrix::from_row_entries(
            2,
            3,
            vec![vec![(0, 1e-310), (2, 4.0)], vec![(1, 1e-310)]],
        );
        m.self_scale(1e-20).unwrap();
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.row_ptr(), &[0, 1, 1]);
        assert_eq!(m.get(0, 2), 4e-20);
        assert_eq!(m.get(0, 0), 0.0);
        assert!(!m.values().contains(&0.0));
    }

    #[test]
    fn test_from_row_entries_ignores_extra_rows() {
        let m = CsrMatrix::from_row_entries(1, 2, vec![vec![(1, 2.0)], vec![(0, 3.0)]]);
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.row_ptr(), &[0, 1]);
        assert_eq!(m.get(0, 1), 2.0);
    }

    #[test]
    fn test_mul_vec() {
        let pool = ThreadPool::new(2).unwrap();
        let m = sample();
        let x: DenseVector = (0..5).map(|i| i as f64).collect();
        let y = m.par_mul_vec(&x, &pool).unwrap();
        assert_eq!(y.as_slice(), &[36.0, 74.0, 16.0, 74.0]);
        assert_eq!(y, m.to_dense().mul_vec(&x).unwrap());
    }

    #[test]
    fn test_transpose_unsupported() {
        let mut m = sample();
        assert!(matches!(
            m.transpose(),
            Err(LinalgError::Unsupported { format: "csr", .. })
        ));
        assert!(m.self_transpose().is_err());
    }

    #[test]
    fn test_has_and_replace_value() {
        let mut m = sample();
        assert!(m.has_value(13.0).unwrap());
        assert!(m.has_value(0.0).unwrap());
        assert_eq!(m.replace_value(13.0, 0.0).unwrap(), 2);
        assert_eq!(m.nnz(), 5);
        assert!(!m.has_value(13.0).unwrap());
    }

    #[test]
    fn test_swap_rows_generic() {
        let mut m = sample();
        m.swap_rows(0, 3);
        assert_eq!(m.row(0).unwrap().0, &[2, 4]);
        assert_eq!(m.row(3).unwrap().0, &[0, 3]);
        assert_eq!(m.get(3, 3), 12.0);
    }

    #[test]
    fn test_density() {
        assert!((sample().density() - 7.0 / 20.0).abs() < 1e-15);
        assert_eq!(CsrMatrix::zeros(0, 0).density(), 0.0);
    }
}
