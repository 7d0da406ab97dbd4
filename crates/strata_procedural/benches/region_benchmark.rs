//! Benchmark for region generation performance.
//!
//! TARGET: one 64x64 region well under 10 seconds
//!
//! Run with: cargo bench --package strata_procedural --bench region_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use strata_procedural::{GeneratorConfig, WorldGenerator, WorldSeed};
use strata_shared::RegionCoord;

fn benchmark_single_region(c: &mut Criterion) {
    let world = WorldGenerator::new(WorldSeed::new(42), GeneratorConfig::default())
        .expect("default config is valid");

    let mut group = c.benchmark_group("region_generation");
    group.throughput(Throughput::Elements(64 * 64));
    group.sample_size(20);

    group.bench_function("single_64x64_region", |b| {
        let mut coord = 0i32;
        b.iter(|| {
            coord = coord.wrapping_add(1);
            black_box(world.generate_region(RegionCoord::new(coord, coord / 2)))
        });
    });

    group.finish();
}

fn benchmark_single_tile(c: &mut Criterion) {
    let world = WorldGenerator::new(WorldSeed::new(42), GeneratorConfig::default())
        .expect("default config is valid");

    c.bench_function("single_tile_generation", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x = x.wrapping_add(1);
            black_box(world.generate_tile(black_box(x), black_box(x / 3)))
        });
    });
}

fn benchmark_spawn_search(c: &mut Criterion) {
    let world = WorldGenerator::new(WorldSeed::new(42), GeneratorConfig::default())
        .expect("default config is valid");

    c.bench_function("spawn_search", |b| {
        b.iter(|| black_box(world.find_spawn_point()));
    });
}

criterion_group!(
    benches,
    benchmark_single_region,
    benchmark_single_tile,
    benchmark_spawn_search
);
criterion_main!(benches);
