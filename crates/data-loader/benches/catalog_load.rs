//! Benchmarks for catalog loading
//!
//! Run with: cargo bench --package data-loader

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{parser, RecipeIndex};
use std::path::Path;

fn bench_load_catalog(c: &mut Criterion) {
    let path = Path::new("../../data/catalog.json");

    c.bench_function("load_catalog", |b| {
        b.iter(|| {
            let index = RecipeIndex::load_from_file(black_box(path)).expect("Failed to load catalog");
            black_box(index)
        })
    });
}

fn bench_build_secondary_indices(c: &mut Criterion) {
    let catalog = parser::parse_catalog(Path::new("../../data/catalog.json"))
        .expect("Failed to parse catalog");
    let mut index = RecipeIndex::from_catalog(catalog).expect("Failed to index catalog");

    c.bench_function("build_secondary_indices", |b| {
        b.iter(|| {
            index.build_secondary_indices();
            black_box(index.counts())
        })
    });
}

criterion_group!(benches, bench_load_catalog, bench_build_secondary_indices);
criterion_main!(benches);
