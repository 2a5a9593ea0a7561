//! Core type definitions for the threat graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an entity
///
/// Ids are chosen by the caller; `n_<sequence>` is the editor's convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl std::borrow::Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct FlowId(String);

impl FlowId {
    pub fn new(id: impl Into<String>) -> Self {
        FlowId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FlowId {
    fn from(s: String) -> Self {
        FlowId(s)
    }
}

impl From<&str> for FlowId {
    fn from(s: &str) -> Self {
        FlowId(s.to_string())
    }
}

/// Kind of an entity
///
/// Unknown kinds (including an empty string for a missing kind) are kept
/// verbatim in `Other` so that they survive an export/import cycle; they
/// simply never match any analysis rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Actor,
    Process,
    Store,
    TrustBoundary,
    Other(String),
    #[default]
    Unset,
}

impl EntityKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Actor => "actor",
            EntityKind::Process => "process",
            EntityKind::Store => "store",
            EntityKind::TrustBoundary => "trustBoundary",
            EntityKind::Other(s) => s,
            EntityKind::Unset => "",
        }
    }

    /// Actors, processes and stores; the kinds that become OTM components
    pub fn is_component(&self) -> bool {
        matches!(self, EntityKind::Actor | EntityKind::Process | EntityKind::Store)
    }

    pub fn is_trust_boundary(&self) -> bool {
        matches!(self, EntityKind::TrustBoundary)
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, EntityKind::Unset)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for EntityKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "actor" => EntityKind::Actor,
            "process" => EntityKind::Process,
            "store" => EntityKind::Store,
            "trustBoundary" => EntityKind::TrustBoundary,
            "" => EntityKind::Unset,
            _ => EntityKind::Other(s),
        }
    }
}

impl From<&str> for EntityKind {
    fn from(s: &str) -> Self {
        EntityKind::from(s.to_string())
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

/// Top-left corner of an entity on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Rendered size of an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}
