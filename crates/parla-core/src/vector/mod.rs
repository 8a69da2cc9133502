//! Vector abstraction
//!
//! [`Vector`] is implemented by the resizable [`DenseVector`] and the fixed
//! [`Vector2d`]/[`Vector3d`]. Every arithmetic operation has three entry
//! points:
//!
//! - `*_with(.., dispatch)`: the kernel, run through a [`Dispatch`]
//! - the plain name (`add`, `dot`, ...): sequential
//! - `par_*`: partitioned across a [`ThreadPool`]
//!
//! Operations named `self_*` mutate in place, the others allocate a result.
//! Fixed-size vectors are never partitioned; their `par_*` entry points run
//! sequentially.

mod dense;
mod fixed;

pub use dense::DenseVector;
pub use fixed::{Vector2d, Vector3d};

use parla_exec::{Dispatch, ThreadPool};
use scirs2_core::random::Rng;

use crate::error::{LinalgError, LinalgResult};
use crate::matrix::{DenseMatrix, Matrix};

/// Dispatch used by the `par_*` entry points of `V`
fn route<V: Vector>(pool: &ThreadPool) -> Dispatch<'_> {
    if V::PARTITIONED {
        Dispatch::Pool(pool)
    } else {
        Dispatch::Sequential
    }
}

/// Elementwise `lhs[i] = op(lhs[i], rhs[i])`
fn zip_in_place<V, F>(
    lhs: &mut V,
    rhs: &V,
    operation: &'static str,
    dispatch: Dispatch<'_>,
    op: F,
) -> LinalgResult<()>
where
    V: Vector,
    F: Fn(f64, f64) -> f64 + Sync,
{
    lhs.check_size(rhs, operation)?;
    let src = rhs.as_slice();
    dispatch.for_each_segment_mut(lhs.as_mut_slice(), |range, segment| {
        for (x, &y) in segment.iter_mut().zip(&src[range.start..range.end]) {
            *x = op(*x, y);
        }
    })?;
    Ok(())
}

/// Logical size-N sequence of `f64`
pub trait Vector: Clone + std::fmt::Debug + Send + Sync {
    /// Whether `par_*` entry points partition work across the pool
    const PARTITIONED: bool = true;

    /// Number of entries
    fn size(&self) -> usize;

    fn as_slice(&self) -> &[f64];

    fn as_mut_slice(&mut self) -> &mut [f64];

    /// Vector of the same size filled with zeros
    fn zeros_like(&self) -> Self;

    /// Entry `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    fn get(&self, i: usize) -> f64 {
        self.as_slice()[i]
    }

    /// Overwrite entry `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    fn set(&mut self, i: usize, value: f64) {
        self.as_mut_slice()[i] = value;
    }

    fn to_dense(&self) -> DenseVector {
        DenseVector::from_vec(self.as_slice().to_vec())
    }

    /// Fail with a dimension mismatch unless both sizes agree
    fn check_size(&self, other: &Self, operation: &'static str) -> LinalgResult<()> {
        if self.size() != other.size() {
            return Err(LinalgError::length_mismatch(
                operation,
                self.size(),
                other.size(),
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Kernels
    // ------------------------------------------------------------------

    fn self_add_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        zip_in_place(self, other, "vector add", dispatch, |a, b| a + b)
    }

    fn self_sub_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        zip_in_place(self, other, "vector sub", dispatch, |a, b| a - b)
    }

    /// Elementwise product in place
    fn self_hadamard_with(&mut self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        zip_in_place(self, other, "hadamard", dispatch, |a, b| a * b)
    }

    fn self_scale_with(&mut self, factor: f64, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        dispatch.for_each_mut(self.as_mut_slice(), |_, x| *x *= factor)?;
        Ok(())
    }

    fn self_negate_with(&mut self, dispatch: Dispatch<'_>) -> LinalgResult<()> {
        dispatch.for_each_mut(self.as_mut_slice(), |_, x| *x = -*x)?;
        Ok(())
    }

    /// `self += alpha · other` in one pass
    fn self_axpy_with(
        &mut self,
        alpha: f64,
        other: &Self,
        dispatch: Dispatch<'_>,
    ) -> LinalgResult<()> {
        zip_in_place(self, other, "axpy", dispatch, move |a, b| a + alpha * b)
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

    fn hadamard_with(&self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<Self> {
        let mut out = self.clone();
        out.self_hadamard_with(other, dispatch)?;
        Ok(out)
    }

    fn scale_with(&self, factor: f64, dispatch: Dispatch<'_>) -> LinalgResult<Self> {
        let mut out = self.clone();
        out.self_scale_with(factor, dispatch)?;
        Ok(out)
    }

    fn negate_with(&self, dispatch: Dispatch<'_>) -> LinalgResult<Self> {
        let mut out = self.clone();
        out.self_negate_with(dispatch)?;
        Ok(out)
    }

    /// Inner product as a reduction over partial sums
    ///
    /// Each partition sums its own segment; the partials are added in
    /// partition order after the join. The last bits of the result can
    /// therefore depend on the number of partitions.
    fn dot_with(&self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<f64> {
        self.check_size(other, "dot")?;
        let (a, b) = (self.as_slice(), other.as_slice());
        let partials = dispatch.map_partitions(a.len(), |range| {
            a[range.start..range.end]
                .iter()
                .zip(&b[range.start..range.end])
                .map(|(x, y)| x * y)
                .sum::<f64>()
        })?;
        Ok(partials.into_iter().sum())
    }

    /// `self · otherᵗ`, one output row per unit of work
    ///
    /// Rows where `self[i] == 0` are left at zero without being visited.
    fn outer_product_with(&self, other: &Self, dispatch: Dispatch<'_>) -> LinalgResult<DenseMatrix> {
        let (u, v) = (self.as_slice(), other.as_slice());
        let mut out = DenseMatrix::zeros(u.len(), v.len());
        dispatch.for_each_row_mut(out.as_mut_slice(), v.len(), |i, row| {
            let a = u[i];
            if a != 0.0 {
                for (dst, &b) in row.iter_mut().zip(v) {
                    *dst = a * b;
                }
            }
        })?;
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Sequential entry points
    // ------------------------------------------------------------------

    fn add(&self, other: &Self) -> LinalgResult<Self> {
        self.add_with(other, Dispatch::Sequential)
    }

    fn sub(&self, other: &Self) -> LinalgResult<Self> {
        self.sub_with(other, Dispatch::Sequential)
    }

    fn hadamard(&self, other: &Self) -> LinalgResult<Self> {
        self.hadamard_with(other, Dispatch::Sequential)
    }

    fn scale(&self, factor: f64) -> LinalgResult<Self> {
        self.scale_with(factor, Dispatch::Sequential)
    }

    fn negate(&self) -> LinalgResult<Self> {
        self.negate_with(Dispatch::Sequential)
    }

    fn dot(&self, other: &Self) -> LinalgResult<f64> {
        self.dot_with(other, Dispatch::Sequential)
    }

    fn outer_product(&self, other: &Self) -> LinalgResult<DenseMatrix> {
        self.outer_product_with(other, Dispatch::Sequential)
    }

    fn self_add(&mut self, other: &Self) -> LinalgResult<()> {
        self.self_add_with(other, Dispatch::Sequential)
    }

    fn self_sub(&mut self, other: &Self) -> LinalgResult<()> {
        self.self_sub_with(other, Dispatch::Sequential)
    }

    fn self_hadamard(&mut self, other: &Self) -> LinalgResult<()> {
        self.self_hadamard_with(other, Dispatch::Sequential)
    }

    fn self_scale(&mut self, factor: f64) -> LinalgResult<()> {
        self.self_scale_with(factor, Dispatch::Sequential)
    }

    fn self_axpy(&mut self, alpha: f64, other: &Self) -> LinalgResult<()> {
        self.self_axpy_with(alpha, other, Dispatch::Sequential)
    }

    fn self_negate(&mut self) -> LinalgResult<()> {
        self.self_negate_with(Dispatch::Sequential)
    }

    // ------------------------------------------------------------------
    // Pool-parallel entry points
    // ------------------------------------------------------------------

    fn par_add(&self, other: &Self, pool: &ThreadPool) -> LinalgResult<Self> {
        self.add_with(other, route::<Self>(pool))
    }

    fn par_sub(&self, other: &Self, pool: &ThreadPool) -> LinalgResult<Self> {
        self.sub_with(other, route::<Self>(pool))
    }

    fn par_hadamard(&self, other: &Self, pool: &ThreadPool) -> LinalgResult<Self> {
        self.hadamard_with(other, route::<Self>(pool))
    }

    fn par_scale(&self, factor: f64, pool: &ThreadPool) -> LinalgResult<Self> {
        self.scale_with(factor, route::<Self>(pool))
    }

    fn par_negate(&self, pool: &ThreadPool) -> LinalgResult<Self> {
        self.negate_with(route::<Self>(pool))
    }

    fn par_dot(&self, other: &Self, pool: &ThreadPool) -> LinalgResult<f64> {
        self.dot_with(other, route::<Self>(pool))
    }

    fn par_outer_product(&self, other: &Self, pool: &ThreadPool) -> LinalgResult<DenseMatrix> {
        self.outer_product_with(other, route::<Self>(pool))
    }

    fn par_self_add(&mut self, other: &Self, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_add_with(other, route::<Self>(pool))
    }

    fn par_self_sub(&mut self, other: &Self, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_sub_with(other, route::<Self>(pool))
    }

    fn par_self_hadamard(&mut self, other: &Self, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_hadamard_with(other, route::<Self>(pool))
    }

    fn par_self_scale(&mut self, factor: f64, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_scale_with(factor, route::<Self>(pool))
    }

    fn par_self_axpy(&mut self, alpha: f64, other: &Self, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_axpy_with(alpha, other, route::<Self>(pool))
    }

    fn par_self_negate(&mut self, pool: &ThreadPool) -> LinalgResult<()> {
        self.self_negate_with(route::<Self>(pool))
    }

    // ------------------------------------------------------------------
    // Geometry
    // ------------------------------------------------------------------

    /// Euclidean norm, `sqrt(self · self)`
    fn length(&self) -> f64 {
        self.as_slice().iter().map(|x| x * x).sum::<f64>().sqrt()
    }

    fn par_length(&self, pool: &ThreadPool) -> LinalgResult<f64> {
        Ok(self.par_dot(self, pool)?.sqrt())
    }

    /// Unit vector in the same direction; a zero vector is returned as is
    fn normalise(&self) -> Self {
        let mut out = self.clone();
        out.self_normalise();
        out
    }

    fn self_normalise(&mut self) {
        let length = self.length();
        if length > 0.0 {
            self.as_mut_slice().iter_mut().for_each(|x| *x /= length);
        }
    }

    /// Rescale to the given length, keeping the direction
    fn set_length(&mut self, length: f64) {
        self.self_normalise();
        self.as_mut_slice().iter_mut().for_each(|x| *x *= length);
    }

    /// Euclidean distance between two points
    fn distance_to(&self, other: &Self) -> LinalgResult<f64> {
        Ok(self.sub(other)?.length())
    }

    /// Angle in radians between two vectors, in `[0, π]`
    ///
    /// Zero when either vector has zero length.
    fn angle_between(&self, other: &Self) -> LinalgResult<f64> {
        let denom = self.length() * other.length();
        if denom == 0.0 {
            return Ok(0.0);
        }
        Ok((self.dot(other)? / denom).clamp(-1.0, 1.0).acos())
    }

    /// Entrywise comparison within an absolute tolerance
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.size() == other.size()
            && self
                .as_slice()
                .iter()
                .zip(other.as_slice())
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Fill with uniform samples from `[lower, upper)`
    fn randomise<R: Rng>(&mut self, lower: f64, upper: f64, rng: &mut R) {
        for x in self.as_mut_slice() {
            *x = if upper > lower {
                rng.random_range(lower..upper)
            } else {
                lower
            };
        }
    }
}
