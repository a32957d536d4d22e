//! Allocator benchmarks on seeded random networks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use partial_incentives::graph::Network;
use partial_incentives::incentives::{degree_frac, discount_frac, tpi};
use partial_incentives::thresholds;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_network(n: u32, avg_degree: u32) -> Network {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut network = Network::new();
    for _ in 0..n {
        network.add_node().unwrap();
    }
    for _ in 0..(n * avg_degree) {
        let src = rng.random_range(0..n);
        let dst = rng.random_range(0..n);
        let _ = network.add_edge(src, dst);
    }
    network
}

fn bench_allocators(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocators");
    for size in [200u32, 1000, 3000] {
        let network = random_network(size, 5);
        let node_thresholds = thresholds::degree_proportional(&network, 0.5).unwrap();
        let budget = size as u64;

        group.bench_with_input(BenchmarkId::new("tpi", size), &size, |b, _| {
            b.iter(|| tpi(black_box(&network), black_box(&node_thresholds)))
        });
        group.bench_with_input(BenchmarkId::new("discount_frac", size), &size, |b, _| {
            b.iter(|| discount_frac(black_box(&network), black_box(&node_thresholds), budget))
        });
        group.bench_with_input(BenchmarkId::new("degree_frac", size), &size, |b, _| {
            b.iter(|| degree_frac(black_box(&network), budget, 7))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_allocators);
criterion_main!(benches);
