//! Benchmarks for the offline diff algebra.
//!
//! Workloads mirror the shapes the compactor is built for: bursts of churn
//! against a small window (insert/replace/delete interleavings) and long
//! overwrite streams that collapse almost entirely.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use diffbus::SeqDiff;
use diffbus_compact::{compact_sequence, squash_sequence};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A valid random edit history over a sequence that starts empty.
fn churn(len: usize, seed: u64) -> Vec<SeqDiff<u64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tracked = 0usize;
    let mut history = Vec::with_capacity(len);
    for step in 0..len as u64 {
        if tracked == 0 {
            history.push(SeqDiff::Insert { index: 0, value: step });
            tracked = 1;
            continue;
        }
        let index = rng.gen_range(0..tracked);
        match rng.gen_range(0u8..3) {
            0 => {
                history.push(SeqDiff::Insert { index, value: step });
                tracked += 1;
            }
            1 => history.push(SeqDiff::Replace { index, value: step }),
            _ => {
                history.push(SeqDiff::Delete { index });
                tracked -= 1;
            }
        }
    }
    history
}

/// An overwrite-heavy stream: repeated replaces over a handful of positions.
fn overwrite_storm(len: usize, positions: usize) -> Vec<SeqDiff<u64>> {
    (0..len as u64)
        .map(|step| SeqDiff::Replace { index: step as usize % positions, value: step })
        .collect()
}

fn bench_compact_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("compact_sequence");
    for size in [64, 512, 4096] {
        let history = churn(size, 7);
        group.bench_with_input(BenchmarkId::new("churn", size), &history, |b, history| {
            b.iter(|| compact_sequence(black_box(history.clone())));
        });
    }
    let storm = overwrite_storm(4096, 16);
    group.bench_function("overwrite_storm/4096", |b| {
        b.iter(|| compact_sequence(black_box(storm.clone())));
    });
    group.finish();
}

fn bench_squash_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("squash_sequence");
    let appends: Vec<SeqDiff<u64>> =
        (0..4096).map(|index| SeqDiff::Insert { index, value: index as u64 }).collect();
    group.bench_function("append_run/4096", |b| {
        b.iter(|| squash_sequence(black_box(appends.clone())).count());
    });
    let scattered = churn(4096, 11);
    group.bench_function("churn/4096", |b| {
        b.iter(|| squash_sequence(black_box(scattered.clone())).count());
    });
    group.finish();
}

criterion_group!(benches, bench_compact_sequence, bench_squash_sequence);
criterion_main!(benches);
