//! Criterion micro-benchmarks comparing the flat and jagged grid layouts.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rawbuf_bench::{shape_walk, REFERENCE_SIDE};
use rawbuf_core::InitMode;
use rawbuf_grid::{FlatGrid, JaggedGrid};

/// Benchmark: row-major traversal of a 256x256 flat grid.
fn bench_flat_row_sum(c: &mut Criterion) {
    let mut grid = FlatGrid::<f64>::new();
    grid.alloc(REFERENCE_SIDE, REFERENCE_SIDE, InitMode::Zeroed)
        .unwrap();
    grid.fill(1.0).unwrap();

    c.bench_function("flat_row_sum_256", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for y in 0..grid.height() {
                for &v in grid.row(y).unwrap() {
                    acc += v;
                }
            }
            black_box(acc);
        });
    });
}

/// Benchmark: the same traversal over the jagged layout.
fn bench_jagged_row_sum(c: &mut Criterion) {
    let mut grid = JaggedGrid::<f64>::new();
    grid.alloc(REFERENCE_SIDE, REFERENCE_SIDE, InitMode::Zeroed)
        .unwrap();
    grid.fill(1.0).unwrap();

    c.bench_function("jagged_row_sum_256", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for y in 0..grid.height() {
                for &v in grid.row(y).unwrap() {
                    acc += v;
                }
            }
            black_box(acc);
        });
    });
}

/// Benchmark: widening a flat grid, which repacks every surviving row.
fn bench_flat_resize_width(c: &mut Criterion) {
    c.bench_function("flat_resize_width_256_to_320", |b| {
        b.iter(|| {
            let mut grid = FlatGrid::<f64>::new();
            grid.alloc(REFERENCE_SIDE, REFERENCE_SIDE, InitMode::Zeroed)
                .unwrap();
            grid.resize(REFERENCE_SIDE + 64, REFERENCE_SIDE, InitMode::Zeroed)
                .unwrap();
            black_box(grid.cell_count());
        });
    });
}

/// Benchmark: growing a jagged grid's height, which leaves surviving row
/// buffers untouched.
fn bench_jagged_resize_height(c: &mut Criterion) {
    c.bench_function("jagged_resize_height_256_to_320", |b| {
        b.iter(|| {
            let mut grid = JaggedGrid::<f64>::new();
            grid.alloc(REFERENCE_SIDE, REFERENCE_SIDE, InitMode::Zeroed)
                .unwrap();
            grid.resize(REFERENCE_SIDE, REFERENCE_SIDE + 64, InitMode::Zeroed)
                .unwrap();
            black_box(grid.cell_count());
        });
    });
}

/// Benchmark: a reproducible walk of mixed resizes on both layouts.
fn bench_shape_walk(c: &mut Criterion) {
    let shapes = shape_walk(42, 16, 96);

    c.bench_function("flat_shape_walk_16_steps", |b| {
        b.iter(|| {
            let mut grid = FlatGrid::<f64>::new();
            grid.alloc(64, 64, InitMode::Zeroed).unwrap();
            for &(w, h) in &shapes {
                grid.resize(w, h, InitMode::Zeroed).unwrap();
            }
            black_box(grid.cell_count());
        });
    });

    c.bench_function("jagged_shape_walk_16_steps", |b| {
        b.iter(|| {
            let mut grid = JaggedGrid::<f64>::new();
            grid.alloc(64, 64, InitMode::Zeroed).unwrap();
            for &(w, h) in &shapes {
                grid.resize(w, h, InitMode::Zeroed).unwrap();
            }
            black_box(grid.cell_count());
        });
    });
}

criterion_group!(
    benches,
    bench_flat_row_sum,
    bench_jagged_row_sum,
    bench_flat_resize_width,
    bench_jagged_resize_height,
    bench_shape_walk
);
criterion_main!(benches);
