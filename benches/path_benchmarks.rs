use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use threatflow::{
    enumerate_paths, enumerate_scored_paths, suggest_attack_methods, AnalyzeOptions, AttackCatalog, Entity,
    EntityKind, Flow, ImpactLikelihoodScorer, SuggestOptions, ThreatGraph,
};

/// Layered graph: one actor, `layers` fully connected process layers of
/// `width`, one store. Worst case for bounded DFS.
fn layered_graph(layers: usize, width: usize) -> ThreatGraph {
    let mut entities = vec![Entity::new("entry", EntityKind::Actor).with_label("UART").with_technology("UART")];
    let mut flows = Vec::new();
    let mut previous = vec!["entry".to_string()];
    for layer in 0..layers {
        let current: Vec<String> = (0..width).map(|i| format!("p{}_{}", layer, i)).collect();
        for id in &current {
            entities.push(Entity::new(id.as_str(), EntityKind::Process).with_label("Linux"));
            for from in &previous {
                flows.push(Flow::new(format!("{}->{}", from, id), from.as_str(), id.as_str()));
            }
        }
        previous = current;
    }
    entities.push(Entity::new("spi", EntityKind::Store).with_label("SPI Device").with_technology("SPI"));
    for from in &previous {
        flows.push(Flow::new(format!("{}->spi", from), from.as_str(), "spi"));
    }
    ThreatGraph::from_parts(entities, flows)
}

/// Benchmark path enumeration as the result cap grows
fn bench_enumerate_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate_paths");
    let graph = layered_graph(6, 6);

    for k in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |b, &k| {
            let options = AnalyzeOptions::default().with_k(k);
            b.iter(|| enumerate_paths(&graph, &options));
        });
    }
    group.finish();
}

/// Benchmark scored enumeration, which ranks every found path
fn bench_scored_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("scored_paths");

    for width in [2, 4, 8].iter() {
        let graph = layered_graph(4, *width);
        group.bench_with_input(BenchmarkId::from_parameter(width), width, |b, _| {
            let options = AnalyzeOptions::default().with_k(500);
            b.iter(|| enumerate_scored_paths(&graph, &options, &ImpactLikelihoodScorer));
        });
    }
    group.finish();
}

/// Benchmark attack-method suggestion over the built-in catalog
fn bench_suggest(c: &mut Criterion) {
    let graph = layered_graph(4, 4);
    let catalog = AttackCatalog::builtin();
    let options = SuggestOptions { k: 100, max_depth: 20 };

    c.bench_function("suggest_attack_methods", |b| {
        b.iter(|| suggest_attack_methods(&graph, &options, &catalog));
    });
}

criterion_group!(benches, bench_enumerate_paths, bench_scored_paths, bench_suggest);
criterion_main!(benches);
