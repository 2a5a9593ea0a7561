//! Graph algorithms module
//!
//! Algorithms are implemented in the `threatflow-graph-algorithms` crate over
//! a dense topology view. This module provides the integration/adapter layer:
//! projecting a [`ThreatGraph`] into a [`GraphView`], inferring sources and
//! targets, and mapping results back to entity ids and labels.

pub mod paths;
pub mod scoring;

use crate::graph::ThreatGraph;
use threatflow_graph_algorithms::GraphView;

// Re-export algorithms
pub use threatflow_graph_algorithms::{simple_paths, top_k_by_score, PathResult, SimplePathConfig};

pub use paths::{
    enumerate_paths, enumerate_scored_paths, infer_sources, infer_targets, is_entry_entity,
    is_target_entity, AnalyzeOptions, AttackPath, ScoredPath, DEFAULT_K, DEFAULT_MAX_DEPTH,
};
pub use scoring::{ImpactLikelihoodScorer, PathScorer};

/// Build a GraphView from the graph for algorithm execution.
///
/// Node ids in the view are the entities' declaration indices. Flows whose
/// endpoints do not resolve are skipped; successor order follows flow order.
pub fn build_view(graph: &ThreatGraph) -> GraphView {
    let node_count = graph.entity_count();
    let index_to_node: Vec<u64> = (0..node_count as u64).collect();
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];

    for flow in graph.flows() {
        let (Some(u), Some(v)) = (
            graph.entity_index(flow.source.as_str()),
            graph.entity_index(flow.target.as_str()),
        ) else {
            continue;
        };
        outgoing[u].push(v);
    }

    GraphView::from_adjacency_list(index_to_node, outgoing)
}
