use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use factorial::{full_factorial_grid, linspace, lm, predict_surface, Factor, FittedModel};

#[cfg(feature = "parallel")]
use factorial::par_predict_surface;

fn model() -> FittedModel {
    let mut table = full_factorial_grid(&[
        ("A", (-1.0, 1.0)),
        ("B", (-1.0, 1.0)),
        ("C", (-1.0, 1.0)),
        ("D", (-1.0, 1.0)),
    ])
    .unwrap();
    let y: Vec<f64> = (0..16).map(|run| 50.0 + (run * 7 % 11) as f64).collect();
    table.insert(Factor::coded("y", &y)).unwrap();
    lm("y ~ A*B*C*D", &table).unwrap()
}

fn bench_predict_surface(c: &mut Criterion) {
    let model = model();
    let other = [("C", 0.5), ("D", -0.5)];
    let mut group = c.benchmark_group("PredictSurface");

    for n in [25, 100, 400] {
        let grid = linspace(-3.2, 3.2, n).to_vec();
        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, _| {
            b.iter(|| predict_surface(&model, "A", "B", &grid, &grid, &other).unwrap());
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |b, _| {
            b.iter(|| par_predict_surface(&model, "A", "B", &grid, &grid, &other).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_predict_surface);
criterion_main!(benches);
