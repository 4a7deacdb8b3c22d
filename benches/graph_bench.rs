//! Benchmarks for the object graph

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use inject_graph::{
    BuilderProvider, Descriptor, Fresh, Graph, Injectable, Shared, TypeKey, ValueProvider, shared,
};
use std::hint::black_box;
use std::sync::Arc;

trait Store: Send + Sync {
    fn size(&self) -> usize;
}

#[derive(Clone, Default)]
struct MemoryStore {
    entries: Vec<u8>,
}

impl Store for MemoryStore {
    fn size(&self) -> usize {
        self.entries.len()
    }
}

impl Injectable for MemoryStore {
    fn describe(d: &mut Descriptor<Self>) {
        d.implements::<dyn Store>(|s| s as Shared<dyn Store>);
    }
}

#[derive(Clone, Default)]
struct Repository {
    store: Option<Shared<dyn Store>>,
    table: Option<String>,
}

impl Injectable for Repository {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("store", |s| &s.store, |s| &mut s.store)
            .named_field("table", "repository.table", |s| &s.table, |s| &mut s.table);
    }
}

#[derive(Clone, Default)]
struct Handler {
    repository: Option<Shared<Repository>>,
    retries: Option<u32>,
}

impl Injectable for Handler {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("repository", |s| &s.repository, |s| &mut s.repository)
            .field("retries", |s| &s.retries, |s| &mut s.retries);
    }
}

fn populated_graph() -> Graph {
    let mut graph = Graph::with_capacity(8);
    graph
        .provide(BuilderProvider::new(|| shared(MemoryStore::default())).singleton())
        .provide(ValueProvider::new(String::from("users")).named("repository.table"))
        .provide(ValueProvider::new(String::from("orders")).named("orders.table"))
        .provide(ValueProvider::new(3_u32))
        .provide(BuilderProvider::new(|r: Fresh<Repository>| shared(r.into_inner())));
    graph
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("value_provider", |b| {
        b.iter(|| {
            let mut graph = Graph::new();
            graph.provide(ValueProvider::new(42_i32));
            black_box(graph)
        })
    });

    group.bench_function("five_providers", |b| b.iter(|| black_box(populated_graph())));

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(1));

    let graph = populated_graph();

    group.bench_function("get_value", |b| {
        b.iter(|| black_box(graph.get::<u32>("").unwrap()))
    });

    group.bench_function("get_named", |b| {
        b.iter(|| black_box(graph.get::<String>("REPOSITORY.TABLE").unwrap()))
    });

    group.bench_function("get_singleton_interface", |b| {
        b.iter(|| black_box(graph.get::<Shared<dyn Store>>("").unwrap().read().size()))
    });

    group.bench_function("find_missing", |b| {
        b.iter(|| black_box(graph.find(TypeKey::of::<u64>(), None, "").is_err()))
    });

    group.finish();
}

fn bench_completion(c: &mut Criterion) {
    let mut group = c.benchmark_group("completion");
    group.throughput(Throughput::Elements(1));

    let graph = populated_graph();

    group.bench_function("flat_target", |b| {
        b.iter(|| {
            let repository = shared(Repository::default());
            graph.complete(&repository).unwrap();
            black_box(repository)
        })
    });

    group.bench_function("nested_through_builder", |b| {
        b.iter(|| {
            let handler = shared(Handler::default());
            graph.complete(&handler).unwrap();
            black_box(handler)
        })
    });

    group.bench_function("resolve_roots", |b| {
        let mut graph = populated_graph();
        let handler = shared(Handler::default());
        graph.provide(ValueProvider::new(Arc::clone(&handler)));
        b.iter(|| black_box(graph.resolve().is_ok()))
    });

    group.finish();
}

criterion_group!(benches, bench_registration, bench_lookup, bench_completion);

criterion_main!(benches);
