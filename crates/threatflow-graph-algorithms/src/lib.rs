//! Topology-only algorithms for Threatflow attack graphs.
//!
//! The crate knows nothing about entities, labels or attributes: callers
//! project their graph into a [`GraphView`] of dense indices, run the
//! algorithms, and map the resulting [`NodeId`]s back.

pub mod common;
pub mod pathfinding;
pub mod ranking;

pub use common::{GraphView, NodeId};
pub use pathfinding::{simple_paths, PathResult, SimplePathConfig};
pub use ranking::top_k_by_score;
