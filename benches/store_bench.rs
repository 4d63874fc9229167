//! Benchmarks for the store join and a full runner step
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use phase_ecs::prelude::*;

#[derive(Debug, Copy, Clone)]
struct Health(u32);

fn populated_store(count: u64) -> ComponentStore {
    let mut store = ComponentStore::new();
    for id in 0..count {
        let entity = Entity::new(id);
        store.add(entity, Position::new(id as f32, 0.0));
        if id % 2 == 0 {
            store.add(entity, Velocity::new(1.0, 0.0));
        }
        store.add(entity, Health(100));
    }
    store
}

// Bench: full-scan join for varying entity counts
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");

    for count in [100u64, 1_000, 10_000] {
        let store = populated_store(count);
        group.bench_with_input(BenchmarkId::new("position_velocity", count), &store, |b, store| {
            b.iter(|| black_box(store.find::<(Position, Velocity)>().len()))
        });
        group.bench_with_input(BenchmarkId::new("velocity_health", count), &store, |b, store| {
            b.iter(|| black_box(store.find::<(Velocity, Health)>().len()))
        });
    }

    group.finish();
}

// Bench: one update step of the movement system
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");

    for count in [1_000u64, 10_000] {
        let mut app = App::new();
        for id in 0..count {
            app.spawn_bundle(Some(id), (Position::new(0.0, 0.0), Velocity::new(1.0, 1.0)))
                .expect("ids are unique");
        }
        let update = Update::shared();
        app.add_system(&update, |_| Movement);

        group.bench_function(BenchmarkId::new("movement", count), |b| {
            b.iter(|| app.step(&update).expect("movement never fails"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_find, bench_step);
criterion_main!(benches);
