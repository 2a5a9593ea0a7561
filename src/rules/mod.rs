//! Attack-method rule engine
//!
//! Matches the technology tags along each enumerated attack path against an
//! ordered catalog of declarative rules and emits de-duplicated attack-method
//! suggestions. The catalog can be extended from YAML without touching the
//! traversal code.

pub mod catalog;
pub mod engine;

pub use catalog::{AttackCatalog, AttackRule, CatalogError, CatalogResult, Predicate, Reference, Severity, Technique};
pub use engine::{evaluate_path, suggest_attack_methods, AttackMethod, SuggestOptions};
