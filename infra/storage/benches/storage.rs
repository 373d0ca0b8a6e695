use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use quire_storage::{Driver, Sink};
use serde::Serialize;
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;
use tokio::runtime::Runtime;

#[derive(Serialize)]
struct Payload {
    id: usize,
    body: String,
}

fn payload(size: usize) -> Payload {
    Payload { id: size, body: "x".repeat(size) }
}

fn connect(rt: &Runtime, temp: &TempDir) -> Driver {
    rt.block_on(async {
        Driver::builder().root(temp.path().join("db")).sink(Sink::silent()).connect().await.unwrap()
    })
}

// ============================================================================
// Benchmark: Atomic Writes
// ============================================================================

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write");
    group.measurement_time(Duration::from_secs(10));

    let temp = TempDir::new().unwrap();
    let rt = Runtime::new().unwrap();
    let db = connect(&rt, &temp);

    let sizes = [("1KB", 1024), ("10KB", 10 * 1024), ("100KB", 100 * 1024)];

    for (name, size) in sizes {
        let record = payload(size);
        group.throughput(Throughput::Bytes(u64::try_from(size).unwrap_or(u64::MAX)));

        group.bench_with_input(BenchmarkId::new("same_resource", name), &record, |b, record| {
            b.to_async(&rt).iter(|| async {
                db.write("bench", name, record).await.unwrap();
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Single Record Reads
// ============================================================================

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");

    let temp = TempDir::new().unwrap();
    let rt = Runtime::new().unwrap();
    let db = connect(&rt, &temp);

    let sizes = [("1KB", 1024), ("10KB", 10 * 1024), ("100KB", 100 * 1024)];

    for (name, size) in sizes {
        rt.block_on(async { db.write("bench", name, &payload(size)).await.unwrap() });
        group.throughput(Throughput::Bytes(u64::try_from(size).unwrap_or(u64::MAX)));

        group.bench_function(BenchmarkId::new("decoded", name), |b| {
            b.to_async(&rt).iter(|| async {
                black_box(db.read::<serde_json::Value>("bench", name).await.unwrap());
            });
        });

        group.bench_function(BenchmarkId::new("raw", name), |b| {
            b.to_async(&rt).iter(|| async {
                black_box(db.read_raw("bench", name).await.unwrap());
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Collection Scans
// ============================================================================

fn bench_read_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_all");

    let temp = TempDir::new().unwrap();
    let rt = Runtime::new().unwrap();
    let db = connect(&rt, &temp);

    for count in [10, 100, 1000] {
        let collection = format!("scan_{count}");
        rt.block_on(async {
            for i in 0..count {
                db.write(&collection, &i.to_string(), &payload(256)).await.unwrap();
            }
        });

        group.bench_function(BenchmarkId::new("list", count), |b| {
            b.to_async(&rt).iter(|| async {
                black_box(db.read_all(&collection).await.unwrap());
            });
        });

        group.bench_function(BenchmarkId::new("map", count), |b| {
            b.to_async(&rt).iter(|| async {
                black_box(db.read_all_map(&collection).await.unwrap());
            });
        });
    }

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_write, bench_read, bench_read_all);

criterion_main!(benches);
