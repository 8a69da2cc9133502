//! Build the same matrix in all three representations and compare them

use anyhow::Result;
use parla::prelude::*;

fn main() -> Result<()> {
    let pool = ThreadPool::new(2)?;

    let mut dense = DenseMatrix::zeros(4, 4);
    let entries = [
        (0, 0, 10.0),
        (0, 3, 12.0),
        (1, 2, 11.0),
        (1, 3, 13.0),
        (2, 1, 16.0),
        (3, 1, 11.0),
        (3, 3, 13.0),
    ];
    for (row, col, value) in entries {
        dense.set(row, col, value);
    }

    let csr = CsrMatrix::from_dense(&dense);
    let hash: HashMatrix = convert(&csr);

    println!("dense:\n{dense}");
    println!(
        "csr: row_ptr = {:?}, col_indices = {:?}, values = {:?}",
        csr.row_ptr(),
        csr.col_indices(),
        csr.values()
    );
    println!("hash: {} stored entries", hash.storage_size());

    let x = DenseVector::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
    println!("dense · x = {}", dense.par_mul_vec(&x, &pool)?);
    println!("csr   · x = {}", csr.par_mul_vec(&x, &pool)?);
    println!("hash  · x = {}", hash.par_mul_vec(&x, &pool)?);

    let shifted = dense.add(&DenseMatrix::identity(4))?;
    println!("det(A + I) = {:.4}", shifted.determinant());
    println!("‖A‖₁ = {}, ‖A‖∞ = {}", csr.norm_1(), csr.norm_infinity());
    Ok(())
}
