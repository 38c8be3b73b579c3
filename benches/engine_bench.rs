//! CaskDB - Performance Benchmarks
//! Measures throughput of the codec and the engine using Criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use caskdb::engine::format::{decode_record, encode_record};
use caskdb::engine::CaskDb;

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    group.bench_function("encode_record", |b| {
        b.iter(|| {
            black_box(encode_record(black_box(1_700_000_000), "key_000500", "value_000500").unwrap());
        });
    });

    group.bench_function("decode_record", |b| {
        let (_, data) = encode_record(1_700_000_000, "key_000500", "value_000500").unwrap();
        b.iter(|| {
            black_box(decode_record(black_box(&data)).unwrap());
        });
    });

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.sample_size(10);

    group.bench_function("set_100", |b| {
        let dir = tempfile::tempdir().unwrap();
        let mut db = CaskDb::open_path(dir.path().join("bench.db")).unwrap();

        b.iter(|| {
            for i in 0..100 {
                let key = format!("key_{:06}", i);
                let value = format!("value_{:06}", i);
                db.set(black_box(&key), black_box(&value)).unwrap();
            }
        });
    });

    group.bench_function("get_hit", |b| {
        let dir = tempfile::tempdir().unwrap();
        let mut db = CaskDb::open_path(dir.path().join("bench.db")).unwrap();
        for i in 0..1000 {
            db.set(&format!("key_{:06}", i), &format!("value_{:06}", i))
                .unwrap();
        }
        b.iter(|| {
            black_box(db.get(black_box("key_000500")).unwrap());
        });
    });

    group.bench_function("get_miss", |b| {
        let dir = tempfile::tempdir().unwrap();
        let db = CaskDb::open_path(dir.path().join("bench.db")).unwrap();
        b.iter(|| {
            black_box(db.get(black_box("nonexistent_key")).unwrap());
        });
    });

    group.finish();
}

fn bench_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("recovery");

    for size in [100, 1000, 10_000].iter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.db");
        {
            let mut db = CaskDb::open_path(&path).unwrap();
            for i in 0..*size {
                db.set(&format!("key_{:06}", i), &format!("value_{:06}", i))
                    .unwrap();
            }
            db.close().unwrap();
        }

        group.bench_with_input(BenchmarkId::new("open", size), size, |b, _| {
            b.iter(|| {
                let db = CaskDb::open_path(&path).unwrap();
                black_box(db.len());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codec, bench_engine, bench_recovery);
criterion_main!(benches);
