//! Benchmarks for dense kernels across thread counts

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use parla_core::{DenseMatrix, DenseVector, Matrix, Vector};
use parla_exec::ThreadPool;

fn bench_mul_vec(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_mul_vec");
    let pool = ThreadPool::new(4).unwrap();

    for &n in &[256usize, 1024] {
        let a = DenseMatrix::random(n, n, 7);
        let x: DenseVector = (0..n).map(|i| i as f64).collect();
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, _| {
            b.iter(|| a.mul_vec(black_box(&x)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("pool", n), &n, |b, _| {
            b.iter(|| a.par_mul_vec(black_box(&x), &pool).unwrap())
        });
    }

    group.finish();
}

fn bench_dot(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense_dot");
    let pool = ThreadPool::new(4).unwrap();
    let n = 1 << 18;
    let a: DenseVector = (0..n).map(|i| (i as f64).sin()).collect();
    let b: DenseVector = (0..n).map(|i| (i as f64).cos()).collect();

    group.throughput(Throughput::Elements(n as u64));
    for active in 1..=4 {
        pool.set_active_threads(active);
        group.bench_with_input(BenchmarkId::from_parameter(active), &active, |bench, _| {
            bench.iter(|| a.par_dot(black_box(&b), &pool).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mul_vec, bench_dot);
criterion_main!(benches);
