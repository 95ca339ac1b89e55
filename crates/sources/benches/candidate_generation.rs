//! Benchmarks for candidate generation
//!
//! Run with: cargo bench --package sources
//!
//! Uses the sample catalog shipped under data/.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{ActivityLevel, Gender, Goal, RecipeIndex, UserProfile};
use sources::{user_context::build_planning_context, CatalogSource, PreferenceSource};
use std::path::Path;
use std::sync::Arc;

fn load_test_data() -> Arc<RecipeIndex> {
    let index = RecipeIndex::load_from_file(Path::new("../../data/catalog.json"))
        .expect("Failed to load test data");
    Arc::new(index)
}

fn test_profile() -> UserProfile {
    UserProfile {
        age: 34,
        gender: Gender::Female,
        height: 165.0,
        weight: 62.0,
        activity_level: ActivityLevel::Moderate,
        goal: Goal::Lose,
        diet_type: vec!["vegetarian".to_string()],
        allergies: vec!["peanuts".to_string()],
    }
}

fn bench_catalog_candidates(c: &mut Criterion) {
    let index = load_test_data();
    let catalog = CatalogSource::new(index.clone());
    let context = build_planning_context(&index, 1, &test_profile()).expect("Failed to build context");

    c.bench_function("catalog_get_candidates", |b| {
        b.iter(|| {
            let candidates = catalog.get_candidates(black_box(&context), black_box(usize::MAX));
            black_box(candidates)
        })
    });
}

fn bench_preference_candidates(c: &mut Criterion) {
    let index = load_test_data();
    let preference = PreferenceSource::new(index.clone());
    let context = build_planning_context(&index, 1, &test_profile()).expect("Failed to build context");

    c.bench_function("preference_get_candidates", |b| {
        b.iter(|| {
            let candidates = preference.get_candidates(black_box(&context), black_box(20));
            black_box(candidates)
        })
    });
}

fn bench_build_planning_context(c: &mut Criterion) {
    let index = load_test_data();
    let profile = test_profile();

    c.bench_function("build_planning_context", |b| {
        b.iter(|| {
            let context = build_planning_context(&index, black_box(1), &profile).unwrap();
            black_box(context)
        })
    });
}

criterion_group!(
    benches,
    bench_catalog_candidates,
    bench_preference_candidates,
    bench_build_planning_context
);
criterion_main!(benches);
