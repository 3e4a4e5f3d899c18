//! Criterion benchmarks for graph construction and click resolution.
//!
//! Run with: `cargo bench`
//!
//! Synthetic artifacts keep the numbers comparable across machines.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Map, Value};

use callnav::present::format_callers;
use callnav::{resolve, CallGraph, ClickQuery, Resolution};

// ─── Helpers ─────────────────────────────────────────────────────────

/// An artifact with `num_files` files, each holding `methods_per_file`
/// methods spaced 25 lines apart. Even methods have callers, odd ones a
/// definition record.
fn build_synthetic_artifact(num_files: usize, methods_per_file: usize) -> Value {
    let mut graph = Map::new();
    for f in 0..num_files {
        let file = format!("module_{}/file_{}.js", f % 50, f);
        for m in 0..methods_per_file {
            let line = (m * 25 + 10) as u32;
            let key = format!("{}:{}:method_{}", file, line, m);
            let entry = if m % 2 == 0 {
                let sites: Vec<Value> = (0..5)
                    .map(|c| json!({
                        "file": format!("callers/caller_{}.js", (f + c) % num_files),
                        "line": c * 7 + 3,
                        "text": format!("method_{}(arg);", m),
                    }))
                    .collect();
                json!({ "referencedAt": sites })
            } else {
                json!({ "definedAt": { format!("defs/def_{}.js", m): { "line": line } } })
            };
            graph.insert(key, entry);
        }
    }
    json!({ "call_graph": graph })
}

fn query(file: &str, line: u32, identifier: &str) -> ClickQuery {
    ClickQuery {
        project: "Bench".to_string(),
        relative_path: file.to_string(),
        clicked_line: line,
        identifier: identifier.to_string(),
    }
}

// ─── Construction ────────────────────────────────────────────────────

fn bench_graph_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_construction");

    for &num_files in &[100, 1_000, 5_000] {
        let artifact = build_synthetic_artifact(num_files, 20);
        group.bench_with_input(BenchmarkId::new("from_artifact", num_files), &artifact, |b, doc| {
            b.iter(|| CallGraph::from_artifact(black_box(doc)))
        });
    }

    group.finish();
}

// ─── Resolution ──────────────────────────────────────────────────────

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let graph = match CallGraph::from_artifact(&build_synthetic_artifact(1_000, 20)) {
        Ok(g) => g,
        Err(e) => panic!("synthetic artifact should build: {}", e),
    };

    let exact = query("module_7/file_7.js", 60, "method_2");
    group.bench_function("exact_line", |b| b.iter(|| resolve(black_box(&exact), &graph)));

    // Clicked line sits 9 lines above the recorded one
    let drifted = query("module_7/file_7.js", 51, "method_2");
    group.bench_function("drift_within_window", |b| b.iter(|| resolve(black_box(&drifted), &graph)));

    // Full window scanned, nothing found
    let miss = query("module_7/file_7.js", 60, "no_such_method");
    group.bench_function("miss_full_window", |b| b.iter(|| resolve(black_box(&miss), &graph)));

    let definition = query("module_7/file_7.js", 35, "method_1");
    group.bench_function("definition", |b| b.iter(|| resolve(black_box(&definition), &graph)));

    group.finish();
}

// ─── Presentation ────────────────────────────────────────────────────

fn bench_format_callers(c: &mut Criterion) {
    let graph = match CallGraph::from_artifact(&build_synthetic_artifact(100, 20)) {
        Ok(g) => g,
        Err(e) => panic!("synthetic artifact should build: {}", e),
    };
    let outcome = resolve(&query("module_3/file_3.js", 10, "method_0"), &graph);
    let Resolution::Callers { identifier, call_sites } = outcome.resolution else {
        panic!("expected callers");
    };

    c.bench_function("format_callers_5_sites", |b| {
        b.iter(|| format_callers(black_box(&identifier), black_box(&call_sites)))
    });
}

criterion_group!(benches, bench_graph_construction, bench_resolve, bench_format_callers);
criterion_main!(benches);
