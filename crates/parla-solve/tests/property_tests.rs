//! Property-based tests for parla-solve

use parla_core::{generate::spd_matrix, DenseMatrix, DenseVector, Matrix, Vector};
use parla_exec::ThreadPool;
use parla_solve::{ConjugateGradient, PreconditionerKind, ProgressLog, SolverConfig};
use parla_sparse::CsrMatrix;
use proptest::prelude::*;

fn solver(kind: PreconditionerKind, n: usize) -> ConjugateGradient {
    ConjugateGradient::new(
        SolverConfig::default()
            .with_tolerance(1e-10)
            .with_preconditioner(kind)
            .with_max_iterations(20 * n + 20),
    )
}

fn kind() -> impl Strategy<Value = PreconditionerKind> {
    prop_oneof![Just(PreconditionerKind::None), Just(PreconditionerKind::Jacobi)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_cg_solves_spd_systems(
        n in 1usize..60,
        seed in any::<u64>(),
        threads in 1usize..5,
        kind in kind(),
    ) {
        let pool = ThreadPool::new(threads).unwrap();
        let a: CsrMatrix = spd_matrix(n, seed);
        let b = DenseVector::from_vec((0..n).map(|i| ((i * 7) % 11) as f64 - 5.0).collect());
        let solution = solver(kind, n).solve(&a, &b, &DenseVector::zeros(n), &pool).unwrap();
        let r = a.mul_vec(&solution.x).unwrap().sub(&b).unwrap();
        prop_assert!(r.length() < 1e-8);
    }

    #[test]
    fn prop_residual_history_matches_iterations(n in 2usize..40, seed in any::<u64>()) {
        let pool = ThreadPool::new(3).unwrap();
        let a: DenseMatrix = spd_matrix(n, seed);
        let b = DenseVector::filled(n, 1.0);
        let mut log = ProgressLog::new();
        let solution = solver(PreconditionerKind::None, n)
            .solve_with_progress(&a, &b, &DenseVector::zeros(n), &pool, &mut log)
            .unwrap();
        prop_assert_eq!(log.len(), solution.info.iterations);
        prop_assert!(log.events().windows(2).all(|w| w[0].iteration + 1 == w[1].iteration));
        prop_assert!(solution.info.residual < 1e-10);
    }

    #[test]
    fn prop_thread_count_does_not_change_solution(n in 1usize..40, seed in any::<u64>()) {
        let pool = ThreadPool::new(4).unwrap();
        let a: CsrMatrix = spd_matrix(n, seed);
        let b = DenseVector::filled(n, 1.0);
        let x0 = DenseVector::zeros(n);
        let solver = solver(PreconditionerKind::Jacobi, n);

        pool.set_active_threads(1);
        let single = solver.solve(&a, &b, &x0, &pool).unwrap();
        pool.set_active_threads(4);
        let many = solver.solve(&a, &b, &x0, &pool).unwrap();
        prop_assert!(single.x.approx_eq(&many.x, 1e-7));
    }
}
