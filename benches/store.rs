// Copyright 2025 Ojima Abraham
// SPDX-License-Identifier: Apache-2.0

//! Benchmarks for versioned store operations.

use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use sstore::storage::{Key, RocksVersionedStore, Value, VersionedStore};
use tempfile::TempDir;

const BUCKET: &str = "bench";
const KEYS: u32 = 10_000;

fn create_test_store() -> (RocksVersionedStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = RocksVersionedStore::open_at(&dir.path().join("bench.db"), Default::default())
        .unwrap();
    (store, dir)
}

fn populate(store: &RocksVersionedStore) {
    for i in 0..KEYS {
        let key = Key::new(BUCKET, format!("key{i:05}"), 1);
        store.put(&key, &Value::new(vec![0u8; 100])).unwrap();
    }
}

fn bench_get(c: &mut Criterion) {
    let (store, _dir) = create_test_store();
    populate(&store);

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get", |b| {
        b.iter_batched(
            || Key::new(BUCKET, format!("key{:05}", rand::random::<u32>() % KEYS), 2),
            |key| store.get(&key).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_put_new(c: &mut Criterion) {
    let (store, _dir) = create_test_store();

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    let counter = AtomicU64::new(0);

    group.bench_function("put_new", |b| {
        b.iter(|| {
            let i = counter.fetch_add(1, Ordering::Relaxed);
            let key = Key::new(BUCKET, format!("new{i}"), 1);
            store.put(&key, &Value::new(vec![0u8; 100])).unwrap()
        })
    });

    group.finish();
}

fn bench_put_update(c: &mut Criterion) {
    let (store, _dir) = create_test_store();

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    // Each update supersedes the previous version of the same identifier.
    let mut current = Key::new(BUCKET, "hot", 1);
    group.bench_function("put_update", |b| {
        b.iter(|| {
            current = store.put(&current, &Value::new(vec![0u8; 100])).unwrap();
        })
    });

    group.finish();
}

fn bench_listing(c: &mut Criterion) {
    let (store, _dir) = create_test_store();
    populate(&store);

    let mut group = c.benchmark_group("store");

    group.bench_function("list_keys_10000", |b| {
        b.iter(|| store.list_keys(BUCKET).unwrap())
    });

    group.bench_function("search_100", |b| {
        b.iter(|| store.search(BUCKET, "key001").unwrap())
    });

    group.bench_function("current_version", |b| {
        let key = Key::new(BUCKET, "key05000", 0);
        b.iter(|| store.current_version(&key).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_get,
    bench_put_new,
    bench_put_update,
    bench_listing,
);
criterion_main!(benches);
