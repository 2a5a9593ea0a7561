//! Attack-path enumeration over a threat graph
//!
//! Sources default to entities flagged `isEntry`, else every actor. Targets
//! default to entities flagged `isTarget`, else stores whose technology or
//! label names a "target"/"goal", else every store. The last fallback trades
//! precision for completeness.

use super::build_view;
use super::scoring::PathScorer;
use crate::graph::{keys, Entity, EntityId, EntityKind, ThreatGraph};
use serde::{Deserialize, Serialize};
use threatflow_graph_algorithms::{simple_paths, top_k_by_score, SimplePathConfig};
use tracing::debug;

pub const DEFAULT_K: usize = 10;
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Options for [`enumerate_paths`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeOptions {
    /// Maximum number of paths (at least 1)
    pub k: usize,
    /// Maximum number of entities on a path (at least 1)
    pub max_depth: usize,
    /// Explicit start entities; inferred when absent or empty
    pub sources: Option<Vec<EntityId>>,
    /// Explicit goal entities; inferred when absent or empty
    pub targets: Option<Vec<EntityId>>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            max_depth: DEFAULT_MAX_DEPTH,
            sources: None,
            targets: None,
        }
    }
}

impl AnalyzeOptions {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.targets = Some(targets.into_iter().map(Into::into).collect());
        self
    }

    fn config(&self) -> SimplePathConfig {
        SimplePathConfig {
            k: self.k.max(1),
            max_depth: self.max_depth.max(1),
        }
    }
}

/// An enumerated simple path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackPath {
    pub node_ids: Vec<EntityId>,
    pub labels: Vec<String>,
}

impl AttackPath {
    pub fn first(&self) -> Option<&EntityId> {
        self.node_ids.first()
    }

    pub fn last(&self) -> Option<&EntityId> {
        self.node_ids.last()
    }

    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }
}

/// An enumerated path with its ranking score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredPath {
    pub node_ids: Vec<EntityId>,
    pub labels: Vec<String>,
    pub score: f64,
}

/// Entry test shared by source inference and the rule engine
pub fn is_entry_entity(entity: &Entity) -> bool {
    entity.flag(keys::IS_ENTRY) || entity.kind == EntityKind::Actor
}

/// Whether a store names itself as the attack goal
pub fn is_target_entity(entity: &Entity) -> bool {
    if entity.flag(keys::IS_TARGET) {
        return true;
    }
    if entity.kind != EntityKind::Store {
        return false;
    }
    let tech = entity.technology().unwrap_or_default().to_lowercase();
    let label = entity.label().unwrap_or_default().to_lowercase();
    tech.contains("target") || label.contains("target") || label.contains("goal")
}

pub fn infer_sources(graph: &ThreatGraph) -> Vec<EntityId> {
    let flagged: Vec<EntityId> = graph
        .entities()
        .filter(|e| e.flag(keys::IS_ENTRY))
        .map(|e| e.id.clone())
        .collect();
    if !flagged.is_empty() {
        return flagged;
    }
    graph
        .entities_of_kind(&EntityKind::Actor)
        .map(|e| e.id.clone())
        .collect()
}

pub fn infer_targets(graph: &ThreatGraph) -> Vec<EntityId> {
    let flagged: Vec<EntityId> = graph
        .entities()
        .filter(|e| e.flag(keys::IS_TARGET))
        .map(|e| e.id.clone())
        .collect();
    if !flagged.is_empty() {
        return flagged;
    }
    let named: Vec<EntityId> = graph
        .entities()
        .filter(|e| is_target_entity(e))
        .map(|e| e.id.clone())
        .collect();
    if !named.is_empty() {
        return named;
    }
    graph
        .entities_of_kind(&EntityKind::Store)
        .map(|e| e.id.clone())
        .collect()
}

fn explicit_or(explicit: Option<&Vec<EntityId>>, infer: impl FnOnce() -> Vec<EntityId>) -> Vec<EntityId> {
    match explicit {
        Some(ids) if !ids.is_empty() => ids.clone(),
        _ => infer(),
    }
}

fn to_view_ids(graph: &ThreatGraph, ids: &[EntityId]) -> Vec<u64> {
    ids.iter()
        .filter_map(|id| graph.entity_index(id.as_str()))
        .map(|idx| idx as u64)
        .collect()
}

/// Enumerate up to `k` simple paths from sources to targets.
///
/// Never fails: an empty graph, no sources, no targets or nothing within the
/// depth bound all produce an empty vector.
pub fn enumerate_paths(graph: &ThreatGraph, options: &AnalyzeOptions) -> Vec<AttackPath> {
    let sources = explicit_or(options.sources.as_ref(), || infer_sources(graph));
    let targets = explicit_or(options.targets.as_ref(), || infer_targets(graph));
    if sources.is_empty() || targets.is_empty() {
        debug!(
            sources = sources.len(),
            targets = targets.len(),
            "No sources or targets, skipping path enumeration"
        );
        return Vec::new();
    }

    let view = build_view(graph);
    let found = simple_paths(
        &view,
        &to_view_ids(graph, &sources),
        &to_view_ids(graph, &targets),
        &options.config(),
    );

    debug!(
        sources = sources.len(),
        targets = targets.len(),
        paths = found.len(),
        "Enumerated attack paths"
    );

    found
        .into_iter()
        .map(|result| {
            let entities: Vec<&Entity> = result
                .path
                .iter()
                .filter_map(|&idx| graph.entity_at(idx as usize))
                .collect();
            AttackPath {
                node_ids: entities.iter().map(|e| e.id.clone()).collect(),
                labels: entities.iter().map(|e| e.display_label().to_string()).collect(),
            }
        })
        .collect()
}

/// Enumerate paths, then rank them best-first with `scorer`.
///
/// Ties keep discovery order.
pub fn enumerate_scored_paths(
    graph: &ThreatGraph,
    options: &AnalyzeOptions,
    scorer: &dyn PathScorer,
) -> Vec<ScoredPath> {
    let scored: Vec<(AttackPath, f64)> = enumerate_paths(graph, options)
        .into_iter()
        .map(|path| {
            let score = scorer.score(graph, &path);
            (path, score)
        })
        .collect();

    top_k_by_score(scored, options.config().k)
        .into_iter()
        .map(|(path, score)| ScoredPath {
            node_ids: path.node_ids,
            labels: path.labels,
            score,
        })
        .collect()
}
