use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use linsvm::optimizer::Lbfgs;
use linsvm::{DifferentiableFunction, LinearSvm, LinearSvmFunction};
use ndarray::{Array1, Array2};
use rand::prelude::*;

/// `dim x n` points drawn around one center per class
fn create_blobs(n: usize, dim: usize, num_classes: usize) -> (Array2<f64>, Array1<usize>) {
    let mut rng = StdRng::seed_from_u64(42);
    let labels: Array1<usize> = (0..n).map(|i| i % num_classes).collect();
    let features = Array2::from_shape_fn((dim, n), |(d, i)| {
        let center = if d % num_classes == labels[i] { 3.0 } else { 0.0 };
        center + rng.gen::<f64>() - 0.5
    });
    (features, labels)
}

fn bench_objective(c: &mut Criterion) {
    let mut group = c.benchmark_group("objective");

    for n in [1000, 10000].iter() {
        let (features, labels) = create_blobs(*n, 20, 4);
        let function =
            LinearSvmFunction::new(features.view(), labels.view(), 4, 0.0001, 1.0, true);
        let parameters = function.initial_point(0);
        let mut gradient = Array2::zeros(function.parameter_shape());

        group.bench_with_input(BenchmarkId::new("evaluate_with_gradient", n), n, |b, _| {
            b.iter(|| function.evaluate_with_gradient(black_box(&parameters), &mut gradient))
        });
    }

    group.finish();
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10);

    let (features, labels) = create_blobs(2000, 20, 4);
    group.bench_function("lbfgs", |b| {
        b.iter(|| {
            let mut model = LinearSvm::new();
            let mut optimizer = Lbfgs::new(100, 1e-10);
            model
                .train(black_box(&features), &labels, 4, &mut optimizer)
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_objective, bench_training);
criterion_main!(benches);
