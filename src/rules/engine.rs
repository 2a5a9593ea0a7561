//! Suggestion engine
//!
//! Enumerates paths from entry entities, evaluates every catalog rule against
//! each path and keeps the first suggestion per (technique, terminal entity).

use super::catalog::{AttackCatalog, Predicate, Reference, Severity};
use crate::algo::{enumerate_paths, is_entry_entity, AnalyzeOptions, AttackPath, DEFAULT_K};
use crate::graph::{Entity, ThreatGraph};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Suggestion depth is larger than plain enumeration so multi-hop pivots are
/// still visible.
pub const SUGGEST_MAX_DEPTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestOptions {
    pub k: usize,
    pub max_depth: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            max_depth: SUGGEST_MAX_DEPTH,
        }
    }
}

/// A technique suggested for a concrete path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackMethod {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    pub matched_path: AttackPath,
}

/// Lowercased text views of one path
struct PathFacts {
    first_tag: String,
    first_label: String,
    last_tag: String,
    last_label: String,
    joined_labels: String,
}

fn label_or_id(entity: &Entity) -> String {
    entity
        .label()
        .map(str::to_lowercase)
        .unwrap_or_else(|| entity.id.as_str().to_lowercase())
}

impl PathFacts {
    fn collect(graph: &ThreatGraph, path: &AttackPath) -> Option<Self> {
        let first = graph.get_entity(path.first()?.as_str())?;
        let last = graph.get_entity(path.last()?.as_str())?;
        Some(Self {
            first_tag: first.tech_tag(),
            first_label: label_or_id(first),
            last_tag: last.tech_tag(),
            last_label: label_or_id(last),
            joined_labels: path.labels.join(" ").to_lowercase(),
        })
    }

    fn holds(&self, predicate: &Predicate) -> bool {
        let any = |texts: &[&str], keywords: &[String]| {
            keywords
                .iter()
                .any(|k| texts.iter().any(|t| t.contains(k.as_str())))
        };
        match predicate {
            Predicate::First(k) => any(&[&self.first_tag, &self.first_label], k),
            Predicate::Last(k) => any(&[&self.last_tag, &self.last_label], k),
            Predicate::PathContains(k) => any(&[&self.joined_labels], k),
        }
    }
}

/// Evaluate every rule against one path, in catalog order
pub fn evaluate_path(graph: &ThreatGraph, path: &AttackPath, catalog: &AttackCatalog) -> Vec<AttackMethod> {
    let Some(facts) = PathFacts::collect(graph, path) else {
        return Vec::new();
    };
    catalog
        .rules()
        .iter()
        .filter(|rule| rule.when.iter().all(|p| facts.holds(p)))
        .map(|rule| AttackMethod {
            id: rule.technique.id.clone(),
            title: rule.technique.title.clone(),
            description: rule.technique.description.clone(),
            severity: rule.technique.severity,
            confidence: rule.technique.confidence,
            references: rule.technique.references.clone(),
            matched_path: path.clone(),
        })
        .collect()
}

/// Suggest attack methods for the paths starting at entry entities.
///
/// Paths come from the inferred sources and targets. A technique is reported
/// once per terminal entity; the first matching path wins.
pub fn suggest_attack_methods(
    graph: &ThreatGraph,
    options: &SuggestOptions,
    catalog: &AttackCatalog,
) -> Vec<AttackMethod> {
    let analyze = AnalyzeOptions::default()
        .with_k(options.k)
        .with_max_depth(options.max_depth);
    let paths = enumerate_paths(graph, &analyze);

    let mut seen: FxHashSet<(String, String)> = FxHashSet::default();
    let mut methods = Vec::new();
    for path in paths.iter().filter(|p| starts_at_entry(graph, p)) {
        for method in evaluate_path(graph, path, catalog) {
            let terminal = path.last().map(|id| id.to_string()).unwrap_or_default();
            if seen.insert((method.id.clone(), terminal)) {
                methods.push(method);
            }
        }
    }
    debug!(
        paths = paths.len(),
        suggestions = methods.len(),
        "Attack method suggestion complete"
    );
    methods
}

fn starts_at_entry(graph: &ThreatGraph, path: &AttackPath) -> bool {
    path.first()
        .and_then(|id| graph.get_entity(id.as_str()))
        .map(is_entry_entity)
        .unwrap_or(false)
}
