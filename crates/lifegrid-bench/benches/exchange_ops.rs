//! Criterion benchmarks for full threaded runs under each decomposition.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lifegrid::exchange::Layout;
use lifegrid::run_simulation;
use lifegrid_bench::profile;

/// Benchmark: 20 generations of a 192x192 frame over 1, 4 and 9 workers.
fn bench_layouts(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_192x20");
    group.sample_size(20);
    for layout in [Layout::Strips, Layout::Blocks] {
        for workers in [1usize, 4, 9] {
            let config = profile(192, 20, workers, layout);
            group.bench_with_input(
                BenchmarkId::new(layout.to_string(), workers),
                &config,
                |b, config| {
                    b.iter(|| black_box(run_simulation(config).unwrap().population()));
                },
            );
        }
    }
    group.finish();
}

/// Benchmark: the same run over buffered rather than rendezvous channels.
fn bench_buffered_mesh(c: &mut Criterion) {
    let mut config = profile(192, 20, 9, Layout::Blocks);
    config.mesh_capacity = 2;
    c.bench_function("run_192x20_blocks9_buffered", |b| {
        b.iter(|| black_box(run_simulation(&config).unwrap().population()));
    });
}

criterion_group!(benches, bench_layouts, bench_buffered_mesh);
criterion_main!(benches);
