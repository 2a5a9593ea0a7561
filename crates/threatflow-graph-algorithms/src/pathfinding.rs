//! Bounded simple-path enumeration
//!
//! Depth-first search from each source in turn. A branch keeps its own
//! visited set, so no vertex repeats inside a path, and it stops the moment
//! it reaches a target: a second target further along the same branch is
//! never explored.

use super::common::{GraphView, NodeId};

/// Limits for [`simple_paths`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimplePathConfig {
    /// Maximum number of paths returned (clamped to at least 1)
    pub k: usize,
    /// Maximum number of vertices on an emitted path (clamped to at least 1)
    pub max_depth: usize,
}

impl Default for SimplePathConfig {
    fn default() -> Self {
        Self { k: 10, max_depth: 16 }
    }
}

/// Result of a pathfinding algorithm
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathResult {
    pub source: NodeId,
    pub target: NodeId,
    pub path: Vec<NodeId>,
}

impl PathResult {
    /// Number of edges on the path
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

struct Search<'a> {
    view: &'a GraphView,
    is_target: Vec<bool>,
    visited: Vec<bool>,
    path: Vec<usize>,
    results: Vec<PathResult>,
    k: usize,
    max_depth: usize,
}

impl Search<'_> {
    fn emit(&mut self) {
        let path: Vec<NodeId> = self.path.iter().map(|&i| self.view.index_to_node[i]).collect();
        self.results.push(PathResult {
            source: path[0],
            target: path[path.len() - 1],
            path,
        });
    }

    fn dfs(&mut self, current: usize) {
        if self.path.len() > self.max_depth {
            return;
        }
        if self.is_target[current] {
            self.emit();
            return;
        }

        let view = self.view;
        for &next in view.successors(current) {
            if self.visited[next] {
                continue;
            }
            self.visited[next] = true;
            self.path.push(next);
            self.dfs(next);
            self.path.pop();
            self.visited[next] = false;

            if self.results.len() >= self.k {
                return;
            }
        }
    }
}

/// Enumerate up to `k` simple paths from `sources` to any of `targets`.
///
/// Sources are explored in the given order and successors in adjacency order,
/// so the result is deterministic for a fixed view. Ids that are not part of
/// the view are ignored. Returns an empty vector when nothing is reachable.
pub fn simple_paths(
    view: &GraphView,
    sources: &[NodeId],
    targets: &[NodeId],
    config: &SimplePathConfig,
) -> Vec<PathResult> {
    let k = config.k.max(1);
    // A simple path never holds more vertices than the view has
    let max_depth = config.max_depth.clamp(1, view.node_count.max(1));

    let mut is_target = vec![false; view.node_count];
    for &t in targets {
        if let Some(idx) = view.index_of(t) {
            is_target[idx] = true;
        }
    }

    let mut search = Search {
        view,
        is_target,
        visited: vec![false; view.node_count],
        path: Vec::with_capacity(max_depth + 1),
        results: Vec::new(),
        k,
        max_depth,
    };

    for &source in sources {
        let Some(start) = view.index_of(source) else {
            continue;
        };
        search.visited[start] = true;
        search.path.push(start);
        search.dfs(start);
        search.path.pop();
        search.visited[start] = false;

        if search.results.len() >= k {
            break;
        }
    }

    let mut results = search.results;
    results.truncate(k);
    results
}
