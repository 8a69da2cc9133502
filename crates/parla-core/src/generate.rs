//! Random test-matrix generators

use scirs2_core::random::{rngs::StdRng, Rng, SeedableRng};

use crate::matrix::Matrix;

/// Sparse symmetric positive definite `n × n` matrix
///
/// Starts from the identity and adds `n` random rank-one updates
/// `v·vᵗ` restricted to a random pair of indices `(i1, i2)` with
/// `v = (v1, v2)` drawn from `[0, 1)`. Each update is symmetric positive
/// semi-definite, so the sum stays SPD. At most `3n` off-diagonal
/// entries are nonzero, which keeps sparse representations sparse.
///
/// # Examples
///
/// ```
/// use parla_core::{generate::spd_matrix, DenseMatrix, Matrix};
///
/// let a: DenseMatrix = spd_matrix(10, 42);
/// assert!(a.is_symmetric());
/// ```
pub fn spd_matrix<M: Matrix>(n: usize, seed: u64) -> M {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = M::zeros(n, n);
    a.self_identity();

    for _ in 0..n {
        let i1 = rng.random_range(0..n);
        let i2 = rng.random_range(0..n);
        let v1: f64 = rng.random_range(0.0..1.0);
        let v2: f64 = rng.random_range(0.0..1.0);

        a.set(i1, i1, a.get(i1, i1) + v1 * v1);
        a.set(i1, i2, a.get(i1, i2) + v1 * v2);
        a.set(i2, i1, a.get(i2, i1) + v2 * v1);
        a.set(i2, i2, a.get(i2, i2) + v2 * v2);
    }

    tracing::trace!(n, seed, nnz = a.storage_size(), "generated SPD matrix");
    a
}
