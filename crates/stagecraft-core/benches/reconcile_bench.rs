//! # Pipeline Benchmarks
//!
//! Performance benchmarks for payload building and reconciliation.
//!
//! Run with: `cargo bench -p stagecraft-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use stagecraft_core::vocabulary::JOBS_TO_BE_DONE_FIELDS;
use stagecraft_core::{SessionState, build, normalize_alternatives, reconcile};
use std::hint::black_box;

/// Create a state with `columns` custom segment columns on top of the vocabulary.
fn create_state(columns: usize) -> SessionState {
    let mut state = SessionState::new();
    for field in JOBS_TO_BE_DONE_FIELDS {
        state
            .segment_data
            .insert((*field).to_string(), json!("filled in"));
    }
    for i in 0..columns {
        state
            .segment_data
            .insert(format!("custom column {}", i), json!(i));
    }
    state
}

/// Mixed-shape competitor list of length `size`.
fn create_alternatives(size: usize) -> Vec<Value> {
    (0..size)
        .map(|i| {
            if i % 2 == 0 {
                json!({ "alternative": format!("competitor {}", i), "description": "legacy" })
            } else {
                json!({ "val1": format!("competitor {}", i), "val3": "cheap" })
            }
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_payload");

    for size in [10, 100, 1000].iter() {
        let state = create_state(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &state, |b, state| {
            b.iter(|| black_box(build(state)));
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let initial = SessionState::new();

    for size in [10, 100, 1000].iter() {
        let payload = serde_json::to_value(build(&create_state(*size))).unwrap_or_default();
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| black_box(reconcile(&initial, payload)));
        });
    }

    group.finish();
}

fn bench_normalize_alternatives(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_alternatives");

    for size in [10, 100, 1000].iter() {
        let entries = create_alternatives(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &entries, |b, entries| {
            b.iter(|| black_box(normalize_alternatives(entries)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_reconcile,
    bench_normalize_alternatives
);
criterion_main!(benches);
