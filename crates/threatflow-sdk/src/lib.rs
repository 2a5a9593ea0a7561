//! Threatflow SDK: client library for the Threatflow executor
//!
//! Provides two executor implementations:
//!
//! - **`EmbeddedExecutor`**: in-process, no network. Runs the operation
//!   dispatcher directly. Ideal for tests and offline tools.
//!
//! - **`RemoteExecutor`**: connects to a running `threatflow-server` via HTTP.
//!
//! Both implement the `ExecutorClient` trait, so the placement of a component
//! never changes its result.
//!
//! # Quick Start
//!
//! ```rust
//! use threatflow_sdk::{EmbeddedExecutor, ExecutorClient};
//! use threatflow_sdk::TaraRow;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = EmbeddedExecutor::new();
//!     let row = TaraRow {
//!         impact_rating: Some("Major".into()),
//!         attack_vector_based_approach: Some("Medium".into()),
//!         ..Default::default()
//!     };
//!     let rows = client.derive_tara(&[row]).await.unwrap();
//!     assert_eq!(rows[0].cal.as_deref(), Some("CAL3"));
//! }
//! ```

pub mod client;
pub mod embedded;
pub mod error;
pub mod models;
pub mod remote;

// ============================================================
// Core SDK types
// ============================================================

pub use client::ExecutorClient;
pub use embedded::EmbeddedExecutor;
pub use error::{ExecutorError, ExecutorResult};
pub use models::{MethodsResponse, PathsResponse, RowsResponse, ScoredPathsResponse, ServerStatus, YamlResponse};
pub use remote::RemoteExecutor;

// ============================================================
// Engine types (re-exported from threatflow core)
// ============================================================

pub use threatflow::graph::{Entity, EntityId, EntityKind, Flow, FlowId, GraphSnapshot, ThreatGraph};
pub use threatflow::interchange::{apply_otm, build_otm, build_threagile, parse_otm, to_yaml, OtmDocument, OtmOptions, ThreagileOptions};
pub use threatflow::rules::{AttackCatalog, AttackMethod, Severity, SuggestOptions};
pub use threatflow::tara::{csv_escape, TaraRow, TaraTable};
pub use threatflow::{AnalyzeOptions, AttackPath, EngineConfig, ScoredPath};

// ============================================================
// Version
// ============================================================

pub use threatflow::VERSION;
