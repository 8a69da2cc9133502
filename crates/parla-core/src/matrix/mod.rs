//! Matrix abstraction
//!
//! [`Matrix`] is implemented by [`DenseMatrix`] here and by the sparse CSR
//! and hash-of-rows representations in `parla-sparse`. Implementors supply
//! element access, a row visitor and the in-place elementwise kernels; the
//! trait derives products, norms and the sequential/`par_*` entry points
//! from those.
//!
//! Every row-parallel operation treats one output row as one unit of work.
//! Capabilities differ per representation: transpose, `has_value` and
//! `replace_value` return [`LinalgError::Unsupported`] unless the
//! representation overrides them.

mod dense;

pub use dense::DenseMatrix;

use parla_exec::{Dispatch, ThreadPool};

use crate::error::{LinalgError, LinalgResult};
use crate::vector::{DenseVector, Vector};

/// Merge row `row` of two equally shaped matrices with `op`, dropping zeros
fn merge_row<M, F>(lhs: &M, rhs: &M, row: usize, op: F) -> Vec<(usize, f64)>
where
    M: Matrix,
    F: Fn(f64, f64) -> f64,
{
    let (a, b) = (lhs.row_entries(row), rhs.row_entries(row));
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let (col, value) = match (a.get(i), b.get(j)) {
            (Some(&(ca, va)), Some(&(cb, vb))) if ca == cb => {
                i += 1;
                j += 1;
                (ca, op(va, vb))
            }
            (Some(&(ca, va)), Some(&(cb, _))) if ca < cb => {
                i += 1;
                (ca, op(va, 0.0))
            }
            (Some(&(ca, va)), None) => {
                i += 1;
                (ca, op(va, 0.0))
            }
            (_, Some(&(cb, vb))) => {
                j += 1;
                (cb, op(0.0, vb))
            }
            (None, None) => break,
        };
        if value != 0.0 {
            out.push((col, value));
        }
    }
    out
}

/// Logical M×N grid of `f64` with interchangeable storage
pub trait Matrix: Clone + std::fmt::Debug + Send + Sync {
    /// Short name of the storage representation
    const FORMAT: &'static str;

    /// Zero-filled `nrows × ncols` matrix
    fn zeros(nrows: usize, ncols: usize) -> Self;

    /// Assemble a matrix from per-row `(column, value)` lists
    ///
    /// Each list must be sorted by column without duplicates. Rows past the
    /// end of `rows` are zero and lists beyond `nrows` are ignored.
    fn from_row_entries(nrows: usize, ncols: usize, rows: Vec<Vec<(usize, f64)>>) -> Self;

    fn nrows(&self) -> usize;

    fn ncols(&self) -> usize;

    /// Value at `(row, col)`; unset cells read as 0
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the matrix.
    fn get(&self, row: usize, col: usize) -> f64;

    /// Overwrite the value at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the matrix.
    fn set(&mut self, row: usize, col: usize, value: f64);

    /// Number of stored elements: all cells for dense, nonzeros for sparse
    fn storage_size(&self) -> usize;

    /// Visit the stored entries of `row` as `(column, value)`
    fn for_each_in_row<F: FnMut(usize, f64)>(&self, row: usize, f: F);

    /// `self += other`, row-parallel
    fn self_add_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()>;

    /// `self -= other`, row-parallel
    fn self_sub_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()>;

    /// `self *= factor`, row-parallel
    fn self_scale_with(&mut self, factor: f64, dispatch: Dispatch<'_>) -> LinalgResult<()>;

    // ------------------------------------------------------------------
    // Shape and conversion
    // ------------------------------------------------------------------

    fn shape(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }

    /// Fail with a dimension mismatch unless both shapes agree
    fn check_same_shape(&self, other: &Self, operation: &'static str) -> LinalgResult<()> {
        if self.shape() != other.shape() {
            return Err(LinalgError::shape_mismatch(
                operation,
                self.shape(),
                other.shape(),
            ));
        }
        Ok(())
    }

    /// Zero matrix of the same shape and representation
    fn new_instance(&self) -> Self {
        Self::zeros(self.nrows(), self.ncols())
    }

    fn to_dense(&self) -> DenseMatrix {
        let mut out = DenseMatrix::zeros(self.nrows(), self.ncols());
        for row in 0..self.nrows() {
            let dst = out.row_mut(row);
            self.for_each_in_row(row, |col, value| dst[col] = value);
        }
        out
    }

    /// Main diagonal as a dense vector of length `min(M, N)`
    fn diagonal(&self) -> DenseVector {
        (0..self.nrows().min(self.ncols()))
            .map(|i| self.get(i, i))
            .collect()
    }

    /// Nonzero entries of `row` as `(column, value)`, sorted by column
    fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        let mut entries = Vec::new();
        self.for_each_in_row(row, |col, value| {
            if value != 0.0 {
                entries.push((col, value));
            }
        });
        entries.sort_unstable_by_key(|&(col, _)| col);
        entries
    }

    /// Dot product of row `row` with a dense slice of length `ncols`
    fn row_dot(&self, row: usize, x: &[f64]) -> f64 {
        let mut sum = 0.0;
        self.for_each_in_row(row, |col, value| sum += value * x[col]);
        sum
    }

    // ------------------------------------------------------------------
    // Kernels
    // ------------------------------------------------------------------

    /// `self · x`, one output entry per row
    fn mul_vec_with(&self, x: &DenseVector, dispatch: Dispatch<'_>) -> LinalgResult<DenseVector> {
        if self.ncols() != x.size() {
            return Err(LinalgError::length_mismatch(
                "matrix-vector product",
                self.ncols(),
                x.size(),
            ));
        }
        let xs = x.as_slice();
        let mut out = DenseVector::zeros(self.nrows());
        dispatch.for_each_mut(out.as_mut_slice(), |row, y| *y = self.row_dot(row, xs))?;
        Ok(out)
    }

    /// `self · other`, one output row per unit of work
    ///
    /// Only stored entries of both operands are visited.
    fn mul_mat_with(&self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<Self> {
        if self.ncols() != other.nrows() {
            return Err(LinalgError::shape_mismatch(
                "matrix product",
                self.shape(),
                other.shape(),
            ));
        }
        let width = other.ncols();
        let rows = dispatch.map_collect(self.nrows(), |row| {
            let mut acc = vec![0.0; width];
            self.for_each_in_row(row, |k, a| {
                other.for_each_in_row(k, |col, b| acc[col] += a * b);
            });
            acc.into_iter()
                .enumerate()
                .filter(|&(_, value)| value != 0.0)
                .collect::<Vec<_>>()
        })?;
        Ok(Self::from_row_entries(self.nrows(), width, rows))
    }

    /// Combine two equally shaped matrices entry by entry into a new one
    ///
    /// Rows are merged independently over their stored entries, one row per
    /// unit of work. Exact zeros are dropped from the result.
    fn merge_with<F>(
        &self,
        other: &Self,
        operation: &'static str,
        dispatch: Dispatch<'_>,
        op: F,
    ) -> LinalgResult<Self>
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        self.check_same_shape(other, operation)?;
        let rows = dispatch.map_collect(self.nrows(), |row| merge_row(self, other, row, &op))?;
        Ok(Self::from_row_entries(self.nrows(), self.ncols(), rows))
    }

    fn add_with(&self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<Self> {
        let mut out = self.clone();
        out.self_add_with(other, dispatch)?;
        Ok(out)
    }

    fn sub_with(&self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<Self> {
        let mut out = self.clone();
        out.self_sub_with(other, dispatch)?;
        Ok(out)
    }

    fn scale_with(&self, factor: f64, dispatch: Dispatch<'_>) -> LinalgResult<Self> {
        let mut out = self.clone();
        out.self_scale_with(factor, dispatch)?;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Sequential entry points
    // ------------------------------------------------------------------

    fn mul_vec(&self, x: &DenseVector) -> LinalgResult<DenseVector> {
        self.mul_vec_with(x, Dispatch::Sequential)
    }

    fn mul_mat(&self, other: &Self) -> LinalgResult<Self> {
        self.mul_mat_with(other, Dispatch::Sequential)
    }

    fn add(&self, other: &Self) -> LinalgResult<Self> {
        self.add_with(other, Dispatch::Sequential)
    }

    fn sub(&self, other: &Self) -> LinalgResult<Self> {
        self.sub_with(other, Dispatch::Sequential)
    }

    fn scale(&self, factor: f64) -> LinalgResult<Self> {
        self.scale_with(factor, Dispatch::Sequential)
    }

    fn self_add(&mut self, other: &Self) -> LinalgResult<()> {
        self.self_add_with(other, Dispatch::Sequential)
    }

    fn self_sub(&mut self, other: &Self) -> LinalgResult<()> {
        self.self_sub_with(other, Dispatch::Sequential)
    }

    fn self_scale(&mut self, factor: f64) -> LinalgResult<()> {
        self.self_scale_with(factor, Dispatch::Sequential)
    }

    // ------------------------------------------------------------------
    // Pool-parallel entry points
    // ------------------------------------------------------------------

    fn par_mul_vec(&self, x: &DenseVector, pool: &ThreadPool) -> LinalgResult<DenseVector> {
        self.mul_vec_with(x, Dispatch::Pool(pool))
    }

    fn par_mul_mat(&self, other: &Self, pool: &ThreadPool) -> LinalgResult<Self> {
        self.mul_mat_with(other, Dispatch::Pool(pool))
    }

    fn par_add(&self, other: &Self, pool: &ThreadPool) -> LinalgResult<Self> {
        self.add_with(other, Dispatch::Pool(pool))
    }

    fn par_sub(&self, other: &Self, pool: &ThreadPool) -> LinalgResult<Self> {
        self.sub_with(other, Dispatch::Pool(pool))
    }

    fn par_scale(&self, factor: f64, pool: &ThreadPool) -> LinalgResult<Self> {
        self.scale_with(factor, Dispatch::Pool(pool))
    }

    fn par_self_add(&mut self, other: &Self, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_add_with(other, Dispatch::Pool(pool))
    }

    fn par_self_sub(&mut self, other: &Self, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_sub_with(other, Dispatch::Pool(pool))
    }

    fn par_self_scale(&mut self, factor: f64, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_scale_with(factor, Dispatch::Pool(pool))
    }

    // ------------------------------------------------------------------
    // Norms and structure
    // ------------------------------------------------------------------

    /// Maximum absolute column sum
    fn norm_1(&self) -> f64 {
        let mut sums = vec![0.0_f64; self.ncols()];
        for row in 0..self.nrows() {
            self.for_each_in_row(row, |col, value| sums[col] += value.abs());
        }
        sums.into_iter().fold(0.0, f64::max)
    }

    /// Maximum absolute row sum
    fn norm_infinity(&self) -> f64 {
        (0..self.nrows())
            .map(|row| {
                let mut sum = 0.0;
                self.for_each_in_row(row, |_, value| sum += value.abs());
                sum
            })
            .fold(0.0, f64::max)
    }

    /// Exact comparison of every stored entry with its mirror image
    fn is_symmetric(&self) -> bool {
        if !self.is_square() {
            return false;
        }
        (0..self.nrows()).all(|row| {
            let mut symmetric = true;
            self.for_each_in_row(row, |col, value| {
                symmetric &= self.get(col, row) == value;
            });
            symmetric
        })
    }

    /// Set the first `min(M, N)` diagonal entries to 1, leaving other cells
    fn self_identity(&mut self) {
        for i in 0..self.nrows().min(self.ncols()) {
            self.set(i, i, 1.0);
        }
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for col in 0..self.ncols() {
            let (va, vb) = (self.get(a, col), self.get(b, col));
            if va != vb {
                self.set(a, col, vb);
                self.set(b, col, va);
            }
        }
    }

    fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for row in 0..self.nrows() {
            let (va, vb) = (self.get(row, a), self.get(row, b));
            if va != vb {
                self.set(row, a, vb);
                self.set(row, b, va);
            }
        }
    }

    fn scale_row(&mut self, row: usize, factor: f64) {
        for (col, value) in self.row_entries(row) {
            self.set(row, col, value * factor);
        }
    }

    fn scale_column(&mut self, col: usize, factor: f64) {
        for row in 0..self.nrows() {
            let value = self.get(row, col);
            if value != 0.0 {
                self.set(row, col, value * factor);
            }
        }
    }

    /// Whether any stored entry equals `value`
    fn has_value(&self, _value: f64) -> LinalgResult<bool> {
        Err(LinalgError::unsupported(Self::FORMAT, "has_value"))
    }

    /// Replace every stored `old` with `new`, returning the count
    fn replace_value(&mut self, _old: f64, _new: f64) -> LinalgResult<usize> {
        Err(LinalgError::unsupported(Self::FORMAT, "replace_value"))
    }

    fn transpose(&self) -> LinalgResult<Self> {
        Err(LinalgError::unsupported(Self::FORMAT, "transpose"))
    }

    fn self_transpose(&mut self) -> LinalgResult<()> {
        Err(LinalgError::unsupported(Self::FORMAT, "self_transpose"))
    }
}
