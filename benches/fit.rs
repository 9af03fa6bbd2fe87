use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use factorial::{full_factorial_grid, lm, Factor, ModelSpec};

fn design(k: usize) -> factorial::ExperimentTable {
    let factors: Vec<(String, (f64, f64))> = (0..k)
        .map(|i| (format!("X{i}"), (-1.0, 1.0)))
        .collect();
    let mut table = full_factorial_grid(&factors).unwrap();
    let y: Vec<f64> = (0..table.runs())
        .map(|run| 10.0 + (run % 7) as f64 - 0.5 * (run % 3) as f64)
        .collect();
    table.insert(Factor::coded("y", &y)).unwrap();
    table
}

fn formula(k: usize) -> String {
    let names: Vec<String> = (0..k).map(|i| format!("X{i}")).collect();
    format!("y ~ {}", names.join("*"))
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parse");

    for k in [3, 5, 7] {
        let table = design(k);
        let formula = formula(k);
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, _| {
            b.iter(|| ModelSpec::parse(&formula, table.names()).unwrap());
        });
    }
    group.finish();
}

fn bench_saturated_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("SaturatedFit");

    for k in [3, 5, 7] {
        let table = design(k);
        let formula = formula(k);
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, _| {
            b.iter(|| lm(&formula, &table).unwrap());
        });
    }
    group.finish();
}

fn bench_main_effects_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("MainEffectsFit");

    for k in [4, 6, 8] {
        let table = design(k);
        let names: Vec<String> = (0..k).map(|i| format!("X{i}")).collect();
        let formula = format!("y ~ {}", names.join(" + "));
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, _| {
            b.iter(|| lm(&formula, &table).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_saturated_fit, bench_main_effects_fit);
criterion_main!(benches);
