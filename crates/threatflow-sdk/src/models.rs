//! Response models shared by both executor modes

use serde::{Deserialize, Serialize};
use threatflow::tara::TaraRow;
use threatflow::{AttackMethod, AttackPath, ScoredPath};

/// Executor health and capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub status: String,
    pub version: String,
    #[serde(default)]
    pub components: Vec<String>,
    /// Number of attack rules loaded
    #[serde(default)]
    pub rules: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsResponse {
    pub paths: Vec<AttackPath>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPathsResponse {
    pub paths: Vec<ScoredPath>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodsResponse {
    pub methods: Vec<AttackMethod>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YamlResponse {
    pub yaml: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowsResponse {
    pub rows: Vec<TaraRow>,
}
