//! Dense row-major matrix

use std::fmt;

use parla_exec::Dispatch;
use scirs2_core::ndarray_ext::Array2;
use scirs2_core::random::{rngs::StdRng, Rng, SeedableRng};

use super::Matrix;
use crate::error::{LinalgError, LinalgResult};

/// Dense matrix stored as one flat row-major buffer
///
/// Element access is O(1); every row operation scans all N columns.
///
/// # Examples
///
/// ```
/// use parla_core::{DenseMatrix, DenseVector, Matrix, Vector};
///
/// let a = DenseMatrix::from_rows(&[vec![4.0, 1.0], vec![1.0, 3.0]]).unwrap();
/// let x = DenseVector::from_vec(vec![1.0, 2.0]);
/// assert_eq!(a.mul_vec(&x).unwrap().as_slice(), &[6.0, 7.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DenseMatrix {
    nrows: usize,
    ncols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Wrap a row-major buffer of length `nrows * ncols`
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::InvalidStructure`] when the length does not
    /// match the shape.
    pub fn from_vec(nrows: usize, ncols: usize, data: Vec<f64>) -> LinalgResult<Self> {
        if data.len() != nrows * ncols {
            return Err(LinalgError::invalid_structure(format!(
                "buffer of length {} cannot hold a {nrows}x{ncols} matrix",
                data.len()
            )));
        }
        Ok(Self { nrows, ncols, data })
    }

    /// Build from equally long rows
    pub fn from_rows(rows: &[Vec<f64>]) -> LinalgResult<Self> {
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
            return Err(LinalgError::invalid_structure(format!(
                "row {bad} has length {}, expected {ncols}",
                rows[bad].len()
            )));
        }
        Ok(Self {
            nrows: rows.len(),
            ncols,
            data: rows.concat(),
        })
    }

    /// `n × n` identity
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        m.self_identity();
        m
    }

    /// Matrix with uniform entries in `[-1, 1)` from a seeded generator
    pub fn random(nrows: usize, ncols: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut m = Self::zeros(nrows, ncols);
        m.randomise(-1.0, 1.0, &mut rng);
        m
    }

    /// Fill with uniform samples from `[lower, upper)`
    pub fn randomise<R: Rng>(&mut self, lower: f64, upper: f64, rng: &mut R) {
        for x in &mut self.data {
            *x = if upper > lower {
                rng.random_range(lower..upper)
            } else {
                lower
            };
        }
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.ncols..(row + 1) * self.ncols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.ncols..(row + 1) * self.ncols]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Apply `f` to every entry in place
    pub fn map_inplace<F: Fn(f64) -> f64>(&mut self, f: F) {
        for x in &mut self.data {
            *x = f(*x);
        }
    }

    /// Copy from a 2D array
    pub fn from_array(array: &Array2<f64>) -> Self {
        let (nrows, ncols) = array.dim();
        Self {
            nrows,
            ncols,
            data: array.iter().copied().collect(),
        }
    }

    /// Copy into a 2D array
    pub fn to_array(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.nrows, self.ncols), |(i, j)| {
            self.data[i * self.ncols + j]
        })
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.nrows && col < self.ncols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.nrows,
            self.ncols
        );
        row * self.ncols + col
    }

    fn zip_rows_with<F>(
        &mut self,
        other: &Self,
        operation: &'static str,
        dispatch: Dispatch<'_>,
        op: F,
    ) -> LinalgResult<()>
    where
        F: Fn(f64, f64) -> f64 + Sync,
    {
        self.check_same_shape(other, operation)?;
        dispatch.for_each_row_mut(&mut self.data, self.ncols, |row, values| {
            for (x, &y) in values.iter_mut().zip(other.row(row)) {
                *x = op(*x, y);
            }
        })?;
        Ok(())
    }
}

impl Matrix for DenseMatrix {
    const FORMAT: &'static str = "dense";

    fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            data: vec![0.0; nrows * ncols],
        }
    }

    fn from_row_entries(nrows: usize, ncols: usize, rows: Vec<Vec<(usize, f64)>>) -> Self {
        let mut m = Self::zeros(nrows, ncols);
        for (row, entries) in rows.into_iter().take(nrows).enumerate() {
            let dst = m.row_mut(row);
            for (col, value) in entries {
                dst[col] = value;
            }
        }
        m
    }

    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.offset(row, col)]
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        let i = self.offset(row, col);
        self.data[i] = value;
    }

    fn storage_size(&self) -> usize {
        self.data.len()
    }

    fn for_each_in_row<F: FnMut(usize, f64)>(&self, row: usize, mut f: F) {
        for (col, &value) in self.row(row).iter().enumerate() {
            f(col, value);
        }
    }

    fn row_dot(&self, row: usize, x: &[f64]) -> f64 {
        self.row(row).iter().zip(x).map(|(a, b)| a * b).sum()
    }

    fn self_add_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        self.zip_rows_with(other, "matrix add", dispatch, |a, b| a + b)
    }

    fn self_sub_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        self.zip_rows_with(other, "matrix sub", dispatch, |a, b| a - b)
    }

    fn self_scale_with(&mut self, factor: f64, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        dispatch.for_each_row_mut(&mut self.data, self.ncols, |_, values| {
            values.iter_mut().for_each(|x| *x *= factor);
        })?;
        Ok(())
    }

    fn to_dense(&self) -> DenseMatrix {
        self.clone()
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let n = self.ncols;
        let (lo, hi) = (a.min(b), a.max(b));
        let (head, tail) = self.data.split_at_mut(hi * n);
        head[lo * n..(lo + 1) * n].swap_with_slice(&mut tail[..n]);
    }

    fn has_value(&self, value: f64) -> LinalgResult<bool> {
        Ok(self.data.contains(&value))
    }

    fn replace_value(&mut self, old: f64, new: f64) -> LinalgResult<usize> {
        let mut count = 0;
        for x in self.data.iter_mut().filter(|x| **x == old) {
            *x = new;
            count += 1;
        }
        Ok(count)
    }

    fn transpose(&self) -> LinalgResult<Self> {
        let mut out = Self::zeros(self.ncols, self.nrows);
        for row in 0..self.nrows {
            for (col, &value) in self.row(row).iter().enumerate() {
                out.data[col * self.nrows + row] = value;
            }
        }
        Ok(out)
    }

    fn self_transpose(&mut self) -> LinalgResult<()> {
        if !self.is_square() {
            return Err(LinalgError::shape_mismatch(
                "self_transpose",
                self.shape(),
                (self.ncols, self.nrows),
            ));
        }
        let n = self.nrows;
        for i in 0..n {
            for j in i + 1..n {
                self.data.swap(i * n + j, j * n + i);
            }
        }
        Ok(())
    }
}

impl fmt::Display for DenseMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.nrows {
            for value in self.row(row) {
                write!(f, "{value:<8.3} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{DenseVector, Vector};
    use parla_exec::ThreadPool;

    fn sample() -> DenseMatrix {
        DenseMatrix::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_from_vec_validates_length() {
        assert!(DenseMatrix::from_vec(2, 2, vec![1.0; 3]).is_err());
        assert!(DenseMatrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
        assert_eq!(DenseMatrix::from_vec(2, 3, vec![0.0; 6]).unwrap().shape(), (2, 3));
    }

    #[test]
    fn test_get_set() {
        let mut m = DenseMatrix::zeros(2, 2);
        assert_eq!(m.get(1, 1), 0.0);
        m.set(1, 0, 3.5);
        assert_eq!(m.get(1, 0), 3.5);
        assert_eq!(m.storage_size(), 4);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds() {
        let m = DenseMatrix::zeros(2, 2);
        let _ = m.get(0, 2);
    }

    #[test]
    fn test_add_parallel_matches_sequential() {
        let pool = ThreadPool::new(4).unwrap();
        let a = DenseMatrix::random(17, 9, 1);
        let b = DenseMatrix::random(17, 9, 2);
        let seq = a.add(&b).unwrap();
        for k in 1..=4 {
            pool.set_active_threads(k);
            assert_eq!(a.par_add(&b, &pool).unwrap(), seq);
        }
    }

    #[test]
    fn test_shape_mismatch() {
        let a = DenseMatrix::zeros(2, 3);
        let b = DenseMatrix::zeros(3, 2);
        assert!(matches!(
            a.add(&b),
            Err(LinalgError::DimensionMismatch { .. })
        ));
        let mut c = a.clone();
        assert!(c.self_sub(&b).is_err());
    }

    #[test]
    fn test_scale_and_sub() {
        let pool = ThreadPool::new(2).unwrap();
        let a = sample();
        let twice = a.par_scale(2.0, &pool).unwrap();
        assert_eq!(twice.row(1), &[8.0, 10.0, 12.0]);
        let diff = twice.par_sub(&a, &pool).unwrap();
        assert_eq!(diff, a);
    }

    #[test]
    fn test_mul_vec_and_mat() {
        let pool = ThreadPool::new(3).unwrap();
        let a = sample();
        let x = DenseVector::from_vec(vec![1.0, 0.0, -1.0]);
        assert_eq!(a.par_mul_vec(&x, &pool).unwrap().as_slice(), &[-2.0, -2.0]);

        let at = a.transpose().unwrap();
        let aat = a.par_mul_mat(&at, &pool).unwrap();
        assert_eq!(aat, DenseMatrix::from_rows(&[vec![14.0, 32.0], vec![32.0, 77.0]]).unwrap());
        assert_eq!(a.mul_mat(&at).unwrap(), aat);
        assert!(a.mul_mat(&a).is_err());
    }

    #[test]
    fn test_transpose() {
        let a = sample();
        let t = a.transpose().unwrap();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.row(2), &[3.0, 6.0]);

        let mut s = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        s.self_transpose().unwrap();
        assert_eq!(s.as_slice(), &[1.0, 3.0, 2.0, 4.0]);

        let mut r = sample();
        assert!(matches!(
            r.self_transpose(),
            Err(LinalgError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_swap_and_scale() {
        let mut a = sample();
        a.swap_rows(0, 1);
        assert_eq!(a.row(0), &[4.0, 5.0, 6.0]);
        a.swap_columns(0, 2);
        assert_eq!(a.row(0), &[6.0, 5.0, 4.0]);
        a.scale_row(1, 10.0);
        assert_eq!(a.row(1), &[30.0, 20.0, 10.0]);
        a.scale_column(1, 0.5);
        assert_eq!(a.get(0, 1), 2.5);
    }

    #[test]
    fn test_has_and_replace_value() {
        let mut a = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 3.0]]).unwrap();
        assert!(a.has_value(2.0).unwrap());
        assert_eq!(a.replace_value(2.0, 7.0).unwrap(), 2);
        assert!(!a.has_value(2.0).unwrap());
    }

    #[test]
    fn test_map_inplace() {
        let mut a = sample();
        a.map_inplace(|x| x * x);
        assert_eq!(a.row(0), &[1.0, 4.0, 9.0]);
    }

    #[test]
    fn test_array_interop() {
        let a = sample();
        let arr = a.to_array();
        assert_eq!(arr.dim(), (2, 3));
        assert_eq!(arr[[1, 2]], 6.0);
        assert_eq!(DenseMatrix::from_array(&arr), a);
    }

    #[test]
    fn test_random_is_seeded() {
        assert_eq!(DenseMatrix::random(4, 4, 9), DenseMatrix::random(4, 4, 9));
        assert!(DenseMatrix::random(4, 4, 9)
            .as_slice()
            .iter()
            .all(|&x| (-1.0..1.0).contains(&x)));
    }

    #[test]
    fn test_display() {
        let m = DenseMatrix::identity(2);
        assert_eq!(m.to_string(), "1.000    0.000    \n0.000    1.000    \n");
    }

    #[test]
    fn test_from_row_entries_row_count() {
        let short = DenseMatrix::from_row_entries(3, 2, vec![vec![(1, 2.0)]]);
        assert_eq!(short.as_slice(), &[0.0, 2.0, 0.0, 0.0, 0.0, 0.0]);

        let long = DenseMatrix::from_row_entries(1, 2, vec![vec![(0, 1.0)], vec![(1, 5.0)]]);
        assert_eq!(long.shape(), (1, 2));
        assert_eq!(long.as_slice(), &[1.0, 0.0]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_round_trip() {
        let a = sample();
        let json = serde_json::to_string(&a).unwrap();
        let back: DenseMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
        assert_eq!(back.get(1, 2), 6.0);
    }
}
