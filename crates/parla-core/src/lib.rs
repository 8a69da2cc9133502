//! # parla-core
//!
//! Storage-polymorphic matrix and vector types for Parla.
//!
//! This crate provides:
//! - the [`Vector`] trait with [`DenseVector`], [`Vector2d`] and [`Vector3d`]
//! - the [`Matrix`] trait with the dense row-major [`DenseMatrix`]
//! - [`LinalgError`], shared by every crate above the execution layer
//! - seeded generators for test matrices ([`generate`])
//!
//! Sparse representations live in `parla-sparse` and implement the same
//! [`Matrix`] trait.
//!
//! ## Sequential and parallel entry points
//!
//! Every arithmetic operation is a kernel written against
//! [`parla_exec::Dispatch`]. The plain method runs it on the calling thread,
//! the `par_` method partitions it across a [`parla_exec::ThreadPool`]
//! supplied by the caller. No matrix or vector owns a pool.
//!
//! ```
//! use parla_core::{DenseMatrix, Matrix};
//! use parla_exec::ThreadPool;
//!
//! let pool = ThreadPool::new(4).unwrap();
//! let a = DenseMatrix::random(64, 64, 1);
//! let b = DenseMatrix::random(64, 64, 2);
//!
//! let sequential = a.add(&b).unwrap();
//! let parallel = a.par_add(&b, &pool).unwrap();
//! assert_eq!(sequential, parallel);
//! ```

pub mod error;
pub mod generate;
pub mod matrix;
pub mod vector;

pub use error::{LinalgError, LinalgResult};
pub use matrix::{DenseMatrix, Matrix};
pub use vector::{DenseVector, Vector, Vector2d, Vector3d};
