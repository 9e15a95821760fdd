//! Fixed-quantity counting payload, idle vs under full synthetic load.

use criterion::{criterion_group, criterion_main, Criterion};

use stressor::{Stressor, StressorConfig};

fn payload_constant_quantity(quantity: u64) {
    let mut counter: u64 = 0;
    for _ in 0..quantity {
        counter = std::hint::black_box(counter.wrapping_add(1));
    }
    std::hint::black_box(counter);
}

fn bench_contention(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("failed to build runtime");

    c.bench_function("payload_idle", |b| {
        b.iter(|| payload_constant_quantity(1_000_000));
    });

    let stressor = runtime.block_on(Stressor::start(StressorConfig::default()));

    c.bench_function("payload_under_load", |b| {
        b.iter(|| payload_constant_quantity(1_000_000));
    });

    stressor.stop();
    runtime.block_on(stressor.stopped());
}

criterion_group!(benches, bench_contention);
criterion_main!(benches);
