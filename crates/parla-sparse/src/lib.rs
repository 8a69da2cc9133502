//! # parla-sparse
//!
//! Sparse matrix representations for Parla.
//!
//! This crate provides:
//! - [`CsrMatrix`]: compressed sparse row storage with sorted columns
//! - [`HashMatrix`]: one hash map per row
//! - conversions between Dense, CSR and hash storage ([`convert`])
//!
//! Both types implement [`parla_core::Matrix`], so every sequential and
//! `par_*` operation of the trait is available. Row-parallel kernels only
//! visit stored entries.
//!
//! | capability      | dense | csr | hash |
//! |-----------------|-------|-----|------|
//! | transpose       | yes   | no  | no   |
//! | has/replace     | yes   | yes | no   |
//! | arithmetic      | yes   | yes | yes  |
//!
//! ```
//! use parla_core::{DenseVector, Matrix};
//! use parla_exec::ThreadPool;
//! use parla_sparse::CsrMatrix;
//!
//! let pool = ThreadPool::new(2).unwrap();
//! let mut a = CsrMatrix::zeros(3, 3);
//! a.set(0, 0, 4.0);
//! a.set(1, 1, 3.0);
//! a.set(2, 0, 1.0);
//!
//! let y = a.par_mul_vec(&DenseVector::from_vec(vec![1.0, 1.0, 1.0]), &pool).unwrap();
//! assert_eq!(y, DenseVector::from_vec(vec![4.0, 3.0, 1.0]));
//! ```

pub mod convert;
pub mod csr;
pub mod hash;

pub use convert::{convert, convert_with, par_convert};
pub use csr::{CsrError, CsrMatrix};
pub use hash::HashMatrix;
