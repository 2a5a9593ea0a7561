//! Threatflow threat/attack graph analysis engine
//!
//! Takes a diagram snapshot (actors, processes, stores, trust boundaries and
//! the directed flows between them) and derives security analysis artifacts
//! from it.
//!
//! # Capabilities
//!
//! - Graph model with geometric trust-boundary containment
//! - Bounded simple-path enumeration from entry points to target assets,
//!   optionally ranked by a pluggable [`algo::PathScorer`]
//! - Rule-based attack-method suggestions from a declarative, YAML-extensible
//!   [`rules::AttackCatalog`]
//! - TARA risk derivation (risk value, attack vector, CAL)
//! - OTM export/import with lossless layout round trip, Threagile export
//! - Named executor components ([`ops::Dispatcher`]) served in-process or
//!   over HTTP ([`http::HttpServer`])
//!
//! Every analysis is a pure function of its inputs: the engine never mutates
//! the caller's graph and keeps no state between calls.
//!
//! ## Example Usage
//!
//! ```rust
//! use threatflow::algo::{enumerate_paths, AnalyzeOptions};
//! use threatflow::graph::{Entity, EntityKind, Flow, ThreatGraph};
//! use threatflow::rules::{suggest_attack_methods, AttackCatalog, SuggestOptions};
//!
//! let graph = ThreatGraph::from_parts(
//!     vec![
//!         Entity::new("uart", EntityKind::Actor).with_label("UART").with_technology("UART"),
//!         Entity::new("linux", EntityKind::Process).with_label("Linux"),
//!         Entity::new("spi", EntityKind::Store).with_label("SPI Device").with_technology("SPI"),
//!     ],
//!     vec![Flow::new("f1", "uart", "linux"), Flow::new("f2", "linux", "spi")],
//! );
//!
//! let paths = enumerate_paths(&graph, &AnalyzeOptions::default());
//! assert_eq!(paths[0].labels, vec!["UART", "Linux", "SPI Device"]);
//!
//! let methods = suggest_attack_methods(&graph, &SuggestOptions::default(), &AttackCatalog::builtin());
//! assert_eq!(methods[0].id, "uart-linux-spi-dump");
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod config;
pub mod graph;
pub mod http;
pub mod interchange;
pub mod ops;
pub mod rules;
pub mod tara;

// Re-export main types for convenience
pub use graph::{
    Entity, EntityId, EntityKind, Flow, FlowId, GraphError, GraphResult, GraphSnapshot, Position, Size,
    ThreatGraph,
};

pub use algo::{
    enumerate_paths, enumerate_scored_paths, AnalyzeOptions, AttackPath, ImpactLikelihoodScorer, PathScorer,
    ScoredPath,
};

pub use rules::{suggest_attack_methods, AttackCatalog, AttackMethod, CatalogError, Severity, SuggestOptions};

pub use tara::{apply_tara_derivations, derive_tara_fields, TaraRow, TaraTable};

pub use interchange::{
    apply_otm, build_otm, build_threagile, parse_otm, MappingError, MappingResult, OtmDocument, OtmOptions,
    ThreagileOptions,
};

pub use config::{ConfigError, EngineConfig};

pub use ops::{Component, Dispatcher, ExecuteRequest, OpsError, OpsResult};

pub use http::HttpServer;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, env!("CARGO_PKG_VERSION"));
    }
}
