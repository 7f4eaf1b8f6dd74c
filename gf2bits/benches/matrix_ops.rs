use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use gf2bits::{BitLu, BitMatrix, BitPolynomial};
use rand::{rngs::SmallRng, SeedableRng};

fn multiply_benchmark(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(1);
    let mut group = c.benchmark_group("BitMatrix::mul");
    for size in [64usize, 256, 1000] {
        let a = BitMatrix::<u64>::random(&mut rng, size, size);
        let b = BitMatrix::<u64>::random(&mut rng, size, size);
        group.bench_with_input(BenchmarkId::new("rows", size), &size, |bencher, _| {
            bencher.iter(|| &a * &b)
        });
        group.bench_with_input(BenchmarkId::new("dot", size), &size, |bencher, _| {
            bencher.iter(|| a.dot(&b))
        });
    }
    group.finish();
}

fn elimination_benchmark(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(2);
    let mut group = c.benchmark_group("BitMatrix::elimination");
    group.sample_size(20);
    for size in [100usize, 500, 1000] {
        let a = BitMatrix::<u64>::random_invertible(&mut rng, size);
        group.bench_with_input(BenchmarkId::new("rank", size), &size, |bencher, _| {
            bencher.iter(|| a.rank())
        });
        group.bench_with_input(BenchmarkId::new("inverse", size), &size, |bencher, _| {
            bencher.iter(|| a.inverse())
        });
        group.bench_with_input(BenchmarkId::new("lu", size), &size, |bencher, _| {
            bencher.iter(|| BitLu::new(&a))
        });
        group.bench_with_input(
            BenchmarkId::new("echelon_in_place", size),
            &size,
            |bencher, _| {
                bencher.iter_batched(
                    || a.clone(),
                    |mut m| m.to_reduced_echelon_form(),
                    BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

fn polynomial_benchmark(c: &mut Criterion) {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut group = c.benchmark_group("BitPolynomial");
    group.sample_size(20);
    for size in [32usize, 128, 256] {
        let a = BitMatrix::<u64>::random(&mut rng, size, size);
        group.bench_with_input(
            BenchmarkId::new("characteristic_polynomial", size),
            &size,
            |bencher, _| bencher.iter(|| a.characteristic_polynomial()),
        );

        let p = BitPolynomial::<u64>::random(&mut rng, size);
        group.bench_with_input(BenchmarkId::new("reduce_log2", size), &size, |bencher, _| {
            bencher.iter(|| p.reduce_x_to_the(1000, true))
        });
        group.bench_with_input(
            BenchmarkId::new("reduce_plain", size),
            &size,
            |bencher, _| bencher.iter(|| p.reduce_x_to_the(1 << 20, false)),
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    multiply_benchmark,
    elimination_benchmark,
    polynomial_benchmark
);
criterion_main!(benches);
