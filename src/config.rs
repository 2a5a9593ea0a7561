//! Engine configuration
//!
//! Loaded from YAML; every section and field is optional and falls back to
//! the defaults below.

use crate::algo::{AnalyzeOptions, DEFAULT_K, DEFAULT_MAX_DEPTH};
use crate::interchange::otm::{DEFAULT_MODEL_NAME, DEFAULT_OTM_VERSION};
use crate::interchange::threagile::{DEFAULT_BUSINESS_CRITICALITY, DEFAULT_THREAGILE_VERSION};
use crate::interchange::{OtmOptions, ThreagileOptions};
use crate::rules::engine::SUGGEST_MAX_DEPTH;
use crate::rules::{AttackCatalog, CatalogError, SuggestOptions};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid server address {0}")]
    Address(String),

    #[error("Attack catalog: {0}")]
    Catalog(#[from] CatalogError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub k: usize,
    pub max_depth: usize,
    pub suggest_max_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            max_depth: DEFAULT_MAX_DEPTH,
            suggest_max_depth: SUGGEST_MAX_DEPTH,
        }
    }
}

/// HTTP executor server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub address: String,
    /// Port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        let raw = format!("{}:{}", self.address, self.port);
        raw.parse().map_err(|_| ConfigError::Address(raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtmConfig {
    pub version: String,
    pub model_name: String,
}

impl Default for OtmConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_OTM_VERSION.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreagileConfig {
    pub version: String,
    pub business_criticality: String,
}

impl Default for ThreagileConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_THREAGILE_VERSION.to_string(),
            business_criticality: DEFAULT_BUSINESS_CRITICALITY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
    pub otm: OtmConfig,
    pub threagile: ThreagileConfig,
    /// Extra YAML attack catalog appended to the built-in rules
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl EngineConfig {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        // An empty file is a valid, all-default config
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions::default()
            .with_k(self.analysis.k)
            .with_max_depth(self.analysis.max_depth)
    }

    pub fn suggest_options(&self) -> SuggestOptions {
        SuggestOptions {
            k: self.analysis.k,
            max_depth: self.analysis.suggest_max_depth,
        }
    }

    pub fn otm_options(&self) -> OtmOptions {
        OtmOptions {
            name: self.otm.model_name.clone(),
            version: self.otm.version.clone(),
        }
    }

    pub fn threagile_options(&self, title: impl Into<String>, date: impl Into<String>) -> ThreagileOptions {
        ThreagileOptions {
            version: self.threagile.version.clone(),
            business_criticality: self.threagile.business_criticality.clone(),
            ..ThreagileOptions::new(title, date)
        }
    }

    /// Built-in rules plus the configured extra catalog, if any
    pub fn attack_catalog(&self) -> ConfigResult<AttackCatalog> {
        let mut catalog = AttackCatalog::builtin();
        if let Some(path) = &self.catalog_path {
            catalog.extend(AttackCatalog::load(path)?);
        }
        Ok(catalog)
    }
}
