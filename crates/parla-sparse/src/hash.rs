//! Hash-of-rows sparse matrix
//!
//! One `column -> value` map per row. Access is O(1) on average and row
//! operations only visit the keys present in a row. Entries are unordered
//! within a row, so transpose, `has_value` and `replace_value` are left
//! unsupported for this representation.

use std::collections::HashMap;

use parla_core::{LinalgResult, Matrix};
use parla_exec::Dispatch;

/// Sparse matrix with one hash map per row
///
/// # Examples
///
/// ```
/// use parla_core::Matrix;
/// use parla_sparse::HashMatrix;
///
/// let mut m = HashMatrix::zeros(1000, 1000);
/// m.set(3, 999, 2.5);
/// assert_eq!(m.get(3, 999), 2.5);
/// assert_eq!(m.get(4, 4), 0.0);
/// assert_eq!(m.storage_size(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HashMatrix {
    rows: Vec<HashMap<usize, f64>>,
    ncols: usize,
}

impl HashMatrix {
    /// Number of stored entries in `row`
    pub fn row_nnz(&self, row: usize) -> usize {
        self.rows[row].len()
    }

    fn check_bounds(&self, row: usize, col: usize) {
        assert!(
            row < self.rows.len() && col < self.ncols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows.len(),
            self.ncols
        );
    }

    fn accumulate_with(
        &mut self,
        other: &Self,
        operation: &'static str,
        sign: f64,
        dispatch: Dispatch<'_>,
    ) -> LinalgResult<()> {
        self.check_same_shape(other, operation)?;
        dispatch.for_each_mut(&mut self.rows, |i, row| {
            for (&col, &value) in &other.rows[i] {
                let sum = row.get(&col).copied().unwrap_or(0.0) + sign * value;
                if sum == 0.0 {
                    row.remove(&col);
                } else {
                    row.insert(col, sum);
                }
            }
        })?;
        Ok(())
    }
}

impl Matrix for HashMatrix {
    const FORMAT: &'static str = "hash";

    fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            rows: vec![HashMap::new(); nrows],
            ncols,
        }
    }

    fn from_row_entries(nrows: usize, ncols: usize, rows: Vec<Vec<(usize, f64)>>) -> Self {
        let mut maps: Vec<HashMap<usize, f64>> = rows
            .into_iter()
            .map(|entries| entries.into_iter().filter(|&(_, v)| v != 0.0).collect())
            .collect();
        maps.resize_with(nrows, HashMap::new);
        Self { rows: maps, ncols }
    }

    fn nrows(&self) -> usize {
        self.rows.len()
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.check_bounds(row, col);
        self.rows[row].get(&col).copied().unwrap_or(0.0)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.check_bounds(row, col);
        if value == 0.0 {
            self.rows[row].remove(&col);
        } else {
            self.rows[row].insert(col, value);
        }
    }

    fn storage_size(&self) -> usize {
        self.rows.iter().map(HashMap::len).sum()
    }

    fn for_each_in_row<F: FnMut(usize, f64)>(&self, row: usize, mut f: F) {
        for (&col, &value) in &self.rows[row] {
            f(col, value);
        }
    }

    fn self_add_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        self.accumulate_with(other, "matrix add", 1.0, dispatch)
    }

    fn self_sub_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        self.accumulate_with(other, "matrix sub", -1.0, dispatch)
    }

    fn self_scale_with(&mut self, factor: f64, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        dispatch.for_each_mut(&mut self.rows, |_, row| {
            if factor == 0.0 {
                row.clear();
            } else {
                row.values_mut().for_each(|v| *v *= factor);
                row.retain(|_, v| *v != 0.0);
            }
        })?;
        Ok(())
    }
}
