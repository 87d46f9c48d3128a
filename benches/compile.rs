//! Compilation benchmarks.
//!
//! These benchmarks measure filter tree compilation at growing tree sizes and
//! per dialect, the cost of the transformation pipeline, and parallel
//! compilation of many independent requests.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use filtertree::operator::coerce::string_to_bool;
use filtertree::{doc, Compiler, DataRequest, DboxDialect, FilterNode, Leaf, Pipeline};
use std::sync::Arc;

const OPERATORS: [&str; 6] = ["eq", "neq", "contains", "gte", "ltedate", "exists"];

/// A balanced tree of alternating `and`/`or` branches, `fanout` children per
/// branch, `depth` levels deep.
fn build_tree(depth: usize, fanout: usize, seed: &mut usize) -> FilterNode {
    if depth == 0 {
        *seed += 1;
        let op = OPERATORS[*seed % OPERATORS.len()];
        return FilterNode::Leaf(
            Leaf::new(format!("Field{}", *seed % 17), op, format!("value-{seed}"))
                .ignore_case(*seed % 3 == 0),
        );
    }

    let children = (0..fanout).map(|_| build_tree(depth - 1, fanout, seed));
    if depth % 2 == 0 {
        FilterNode::and(children)
    } else {
        FilterNode::or(children)
    }
}

fn bench_tree_size(c: &mut Criterion) {
    let compiler = Compiler::new();
    let mut group = c.benchmark_group("tree_size");

    for depth in [1usize, 2, 3, 4] {
        let tree = build_tree(depth, 4, &mut 0);
        group.bench_with_input(BenchmarkId::new("compile", depth), &tree, |b, tree| {
            b.iter(|| compiler.compile(black_box(tree)))
        });
    }

    group.finish();
}

fn bench_dialects(c: &mut Criterion) {
    let tree = build_tree(3, 4, &mut 0);
    let mut group = c.benchmark_group("dialect");

    let compilers = [
        ("mongo", Compiler::new()),
        ("dbox", Compiler::new().with_dialect(Arc::new(DboxDialect))),
    ];
    for (name, compiler) in &compilers {
        group.bench_with_input(BenchmarkId::new("compile", name), &tree, |b, tree| {
            b.iter(|| compiler.compile(black_box(tree)))
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let compiler = Compiler::new();
    let pipeline = Pipeline::new()
        .map_fields(str::to_lowercase)
        .map_leaves(|leaf| {
            if leaf.field == "field0" {
                leaf.field = "_id".to_string();
            }
        })
        .before_parse(|leaf| {
            (leaf.field == "field1")
                .then(|| doc! { "field1": string_to_bool(&leaf.value_text(), false) })
        });
    let tree = build_tree(3, 4, &mut 0);

    c.bench_function("pipeline_run", |b| {
        b.iter(|| {
            let mut tree = tree.clone();
            pipeline.run(&compiler, black_box(&mut tree))
        })
    });
}

fn bench_request_decode(c: &mut Criterion) {
    let request = DataRequest {
        filter: Some(build_tree(3, 4, &mut 0)),
        ..Default::default()
    };
    let payload = serde_json::to_string(&request).unwrap();
    let compiler = Compiler::new();

    c.bench_function("decode_and_compile_request", |b| {
        b.iter(|| {
            let request = DataRequest::from_json_str(black_box(&payload)).unwrap();
            compiler.compile_request(&request)
        })
    });
}

fn bench_compile_many(c: &mut Criterion) {
    let compiler = Compiler::new();
    let mut group = c.benchmark_group("compile_many");

    for count in [16usize, 256, 1024] {
        let mut seed = 0;
        let trees: Vec<FilterNode> = (0..count).map(|_| build_tree(2, 4, &mut seed)).collect();
        group.bench_with_input(BenchmarkId::new("parallel", count), &trees, |b, trees| {
            b.iter(|| compiler.compile_many(black_box(trees)))
        });
        group.bench_with_input(BenchmarkId::new("sequential", count), &trees, |b, trees| {
            b.iter(|| {
                trees
                    .iter()
                    .map(|tree| compiler.compile(tree))
                    .collect::<Vec<_>>()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_tree_size,
    bench_dialects,
    bench_pipeline,
    bench_request_decode,
    bench_compile_many
);
criterion_main!(benches);
