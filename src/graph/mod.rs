//! Threat graph model
//!
//! Entities (actors, processes, stores, trust boundaries), directed flows
//! between them, and the derived trust-boundary containment. The model has no
//! analysis behavior of its own; every engine operation takes a `&ThreatGraph`
//! and returns fresh values.

pub mod entity;
pub mod flow;
pub mod property;
pub mod store;
pub mod types;

// Re-export main types
pub use entity::{keys, Entity, EntityAttributes};
pub use flow::{Flow, FlowAttributes};
pub use property::PropertyMap;
pub use store::{GraphError, GraphResult, GraphSnapshot, ThreatGraph};
pub use types::{EntityId, EntityKind, FlowId, Position, Size};
