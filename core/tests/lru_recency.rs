// core/tests/lru_recency.rs
//
// Recency-cache behavior through the full engine:
// - capacity 1: resolving A, B, A recomputes A (evicted by B) and the
//   recomputed selection equals the first
// - capacity 0 disables caching entirely
// - hit/miss statistics reflect real engine usage

use std::sync::Arc;

use homofo_core::{CmuLexicon, Config, Engine, GraphStore, TableFrequency, TableSoundAlike};

fn engine_with_capacity(cache_capacity: usize) -> Engine {
    Engine::new(
        CmuLexicon::load_demo(),
        TableSoundAlike::new(),
        TableFrequency::demo(),
        Arc::new(GraphStore::in_memory()),
        Config {
            cache_capacity,
            ..Config::default()
        },
    )
    .unwrap()
}

#[test]
fn capacity_one_evicts_and_recomputes_identically() {
    let engine = engine_with_capacity(1);

    let first = engine.resolve("night");
    let _ = engine.resolve("read");
    let third = engine.resolve("night");

    // Three resolutions, zero hits: "night" was evicted when "read" landed.
    assert_eq!(engine.cache_stats(), (0, 3));
    assert_eq!(first, third);
    assert_eq!(first.unwrap().spelling(), "knight");
}

#[test]
fn zero_capacity_recomputes_every_lookup() {
    let engine = engine_with_capacity(0);
    let a = engine.resolve("night");
    let b = engine.resolve("night");
    assert_eq!(a, b);
    assert_eq!(engine.cache_stats(), (0, 2));
}

#[test]
fn repeated_lookups_hit_within_capacity() {
    let engine = engine_with_capacity(8);
    for _ in 0..3 {
        let got = engine.resolve("night");
        assert_eq!(got.unwrap().spelling(), "knight");
    }
    let _ = engine.resolve("bean");
    assert_eq!(engine.cache_stats(), (2, 2));
}
