//! Solve one sparse SPD system with 1..=N active workers and print timings
//!
//! ```text
//! cargo run --release -p parla --example cg_scaling -- 20000
//! PARLA_LOG_FORMAT=compact RUST_LOG=parla_solve=debug cargo run -p parla --example cg_scaling
//! ```

use anyhow::Result;
use parla::logging::{init_tracing, TracingConfig};
use parla::prelude::*;

fn main() -> Result<()> {
    init_tracing(TracingConfig::default())?;

    let n: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 5_000,
    };

    let pool = ThreadPool::with_config(PoolConfig::default())?;
    tracing::info!(n, workers = pool.num_threads(), "starting scaling run");
    let a: CsrMatrix = spd_matrix(n, 42);
    let b = DenseVector::filled(n, 1.0);
    let x0 = DenseVector::zeros(n);
    let solver = ConjugateGradient::new(
        SolverConfig::default()
            .with_tolerance(1e-10)
            .with_preconditioner(PreconditionerKind::Jacobi),
    );

    println!("n = {n}, nnz = {}, workers = {}", a.nnz(), pool.num_threads());
    println!("{:>7}  {:>10}  {:>10}  {:>8}", "threads", "iterations", "ms", "speedup");

    let mut baseline = None;
    for threads in 1..=pool.num_threads() {
        pool.set_active_threads(threads);
        let solution = solver.solve(&a, &b, &x0, &pool)?;
        let ms = solution.info.elapsed.as_secs_f64() * 1e3;
        let base = *baseline.get_or_insert(ms);
        println!(
            "{threads:>7}  {:>10}  {ms:>10.2}  {:>8.2}",
            solution.info.iterations,
            base / ms
        );
    }
    Ok(())
}
