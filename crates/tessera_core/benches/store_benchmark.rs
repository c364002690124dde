//! # Component Store Benchmark
//!
//! ARCHITECT'S REQUIREMENTS:
//! - Add/remove churn stays O(1) per operation
//! - Lookup through the entity index table is a couple of loads
//! - Traversal cost scales with slot count, not churn history
//!
//! Run with: `cargo bench --package tessera_core`

// Benchmarks don't need docs and may have intentionally unused code
#![allow(missing_docs)]
#![allow(dead_code)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tessera_core::{Component, EntityId, EntityManager, VectorPool};

/// Entity count for the large benchmarks.
const ENTITY_COUNT: usize = 100_000;

struct Position;

impl Component for Position {
    type Data = [f32; 4];
}

fn populated(count: usize) -> (EntityManager, Vec<EntityId>) {
    let mut manager = EntityManager::new();
    manager.register_component(Position).unwrap();
    let entities: Vec<EntityId> = (0..count)
        .map(|_| {
            let e = manager.allocate_new_entity();
            manager.add_component::<Position>(e);
            e
        })
        .collect();
    (manager, entities)
}

/// Benchmark: Raw pool allocate/free churn.
fn bench_pool_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_churn");

    for count in [1_000, 10_000, ENTITY_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut pool: VectorPool<u64> = VectorPool::with_capacity(count);
            let mut handles: Vec<usize> = (0..count as u64).map(|v| pool.allocate(v)).collect();
            b.iter(|| {
                for handle in &mut handles {
                    let value = pool.free(*handle);
                    *handle = pool.allocate(value + 1);
                }
                black_box(pool.len())
            });
        });
    }

    group.finish();
}

/// Benchmark: Add then remove a component on every entity.
fn bench_add_remove(c: &mut Criterion) {
    let mut manager = EntityManager::new();
    manager.register_component(Position).unwrap();
    let entities: Vec<EntityId> = (0..ENTITY_COUNT).map(|_| manager.allocate_new_entity()).collect();

    c.bench_function("add_remove_100K", |b| {
        b.iter(|| {
            for e in &entities {
                manager.add_component::<Position>(*e);
            }
            for e in &entities {
                manager.remove_component::<Position>(*e);
            }
            black_box(manager.entity_count())
        });
    });
}

/// Benchmark: Lookup by entity in random order.
fn bench_random_lookup(c: &mut Criterion) {
    let (manager, mut entities) = populated(ENTITY_COUNT);
    entities.shuffle(&mut ChaCha8Rng::seed_from_u64(7));

    c.bench_function("random_lookup_100K", |b| {
        b.iter(|| {
            let mut sum = 0.0_f32;
            for e in &entities {
                if let Some(position) = manager.component_data::<Position>(*e) {
                    sum += position[0];
                }
            }
            black_box(sum)
        });
    });
}

/// Benchmark: Full traversal, dense vs. after heavy churn.
fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");

    let (mut dense, _) = populated(ENTITY_COUNT);
    group.bench_function("dense_100K", |b| {
        b.iter(|| {
            let store = dense.component_mut::<Position>().unwrap();
            for (_, position) in store.iter_mut() {
                position[0] += 0.016;
            }
            black_box(store.len())
        });
    });

    let (mut sparse, entities) = populated(ENTITY_COUNT);
    for e in entities.iter().step_by(2) {
        sparse.remove_component::<Position>(*e);
    }
    group.bench_function("half_free_100K_slots", |b| {
        b.iter(|| {
            let store = sparse.component_mut::<Position>().unwrap();
            for (_, position) in store.iter_mut() {
                position[0] += 0.016;
            }
            black_box(store.len())
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_pool_churn,
    bench_add_remove,
    bench_random_lookup,
    bench_iteration,
);

criterion_main!(benches);
