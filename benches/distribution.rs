use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vitals::{Bucketer, Distribution};

fn distribution_add(c: &mut Criterion) {
    let dist = Distribution::new(&Bucketer::exponential(20, 1.0, 2.0));
    let mut value = 0.0f64;
    c.bench_function("distribution/add", |b| {
        b.iter(|| {
            value = (value + 1.0) % 1_000_000.0;
            dist.add(black_box(value));
        })
    });
}

fn distribution_snapshot(c: &mut Criterion) {
    let dist = Distribution::new(&Bucketer::exponential(20, 1.0, 2.0));
    for i in 0..100_000 {
        dist.add(i as f64);
    }
    c.bench_function("distribution/snapshot", |b| b.iter(|| black_box(dist.snapshot())));
}

criterion_group!(benches, distribution_add, distribution_snapshot);
criterion_main!(benches);
