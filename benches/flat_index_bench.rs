//! Performance benchmarks for exact flat index search
//!
//! Measures brute-force k-NN latency at corpus sizes typical for a handful
//! of legal documents (hundreds to tens of thousands of pages).

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use legalrag::embedding::normalize;
use legalrag::{FlatIndex, VectorDimension};
use std::hint::black_box;

const DIMENSION: usize = 384;

/// Deterministic unit vectors from a xorshift generator.
fn create_unit_vectors(count: usize, seed: u32) -> Vec<Vec<f32>> {
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        (state % 2000) as f32 / 1000.0 - 1.0
    };

    (0..count)
        .map(|row| {
            let mut vector: Vec<f32> = (0..DIMENSION).map(|_| next()).collect();
            normalize(&mut vector, row).unwrap();
            vector
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_index_search_top5");
    let query = create_unit_vectors(1, 7).remove(0);

    for size in [500usize, 5_000, 20_000] {
        let mut index = FlatIndex::new(VectorDimension::new(DIMENSION).unwrap());
        index.add(&create_unit_vectors(size, 42)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &index, |b, index| {
            b.iter(|| black_box(index.search(black_box(&query), 5).unwrap()));
        });
    }
    group.finish();
}

fn bench_add(c: &mut Criterion) {
    let vectors = create_unit_vectors(1_000, 3);

    c.bench_function("flat_index_add_1000", |b| {
        b.iter(|| {
            let mut index = FlatIndex::new(VectorDimension::new(DIMENSION).unwrap());
            index.add(black_box(&vectors)).unwrap();
            black_box(index.size())
        });
    });
}

criterion_group!(benches, bench_search, bench_add);
criterion_main!(benches);
