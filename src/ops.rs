//! Named executor components
//!
//! Every component takes an `{otm, op}` request and returns JSON: either the
//! updated OTM document or an analysis result. The same [`Dispatcher`] serves
//! in-process callers and the HTTP executor server, so results do not depend
//! on where a component runs.

use crate::algo::{enumerate_paths, enumerate_scored_paths, AnalyzeOptions, ImpactLikelihoodScorer};
use crate::config::{ConfigResult, EngineConfig};
use crate::graph::EntityId;
use crate::interchange::{
    apply_otm, build_threagile, parse_otm, to_yaml, MappingError, OtmDataflow, OtmDocument, OtmTrustZone,
};
use crate::rules::{suggest_attack_methods, AttackCatalog, SuggestOptions};
use crate::tara::{apply_tara_derivations, TaraRow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum OpsError {
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Component {0} requires an OTM document")]
    MissingOtm(Component),

    #[error("Invalid op for {component}: {message}")]
    InvalidOp { component: Component, message: String },

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type OpsResult<T> = Result<T, OpsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    DataflowEditor,
    TrustzoneManager,
    AttackPaths,
    AttackMethods,
    ThreagileExport,
    TaraDerive,
}

impl Component {
    pub const ALL: [Component; 6] = [
        Component::DataflowEditor,
        Component::TrustzoneManager,
        Component::AttackPaths,
        Component::AttackMethods,
        Component::ThreagileExport,
        Component::TaraDerive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::DataflowEditor => "dataflow-editor",
            Component::TrustzoneManager => "trustzone-manager",
            Component::AttackPaths => "attack-paths",
            Component::AttackMethods => "attack-methods",
            Component::ThreagileExport => "threagile-export",
            Component::TaraDerive => "tara-derive",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Component {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Component::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| OpsError::UnknownComponent(s.to_string()))
    }
}

/// Request body of every component
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otm: Option<Value>,
    #[serde(default)]
    pub op: Value,
}

impl ExecuteRequest {
    pub fn new(otm: Option<Value>, op: Value) -> Self {
        Self { otm, op }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum DataflowOp {
    Add { dataflow: OtmDataflow },
    Remove { id: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
enum TrustZoneOp {
    Add {
        #[serde(rename = "trustZone")]
        trust_zone: OtmTrustZone,
    },
    Assign {
        #[serde(rename = "componentId")]
        component_id: String,
        #[serde(rename = "trustZoneId")]
        trust_zone_id: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AttackPathsOp {
    k: Option<usize>,
    max_depth: Option<usize>,
    sources: Option<Vec<EntityId>>,
    targets: Option<Vec<EntityId>>,
    scored: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AttackMethodsOp {
    k: Option<usize>,
    max_depth: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThreagileExportOp {
    title: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaraDeriveOp {
    rows: Vec<TaraRow>,
}

/// Executes components against one configuration and attack catalog
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: EngineConfig,
    catalog: AttackCatalog,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            catalog: AttackCatalog::builtin(),
        }
    }
}

impl Dispatcher {
    /// Build a dispatcher, loading the configured extra catalog
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        let catalog = config.attack_catalog()?;
        Ok(Self { config, catalog })
    }

    pub fn with_catalog(config: EngineConfig, catalog: AttackCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &AttackCatalog {
        &self.catalog
    }

    /// Run a component by name
    pub fn execute(&self, component: &str, request: &ExecuteRequest) -> OpsResult<Value> {
        let component: Component = component.parse()?;
        debug!(%component, "Executing component");
        match component {
            Component::DataflowEditor => self.dataflow_editor(request),
            Component::TrustzoneManager => self.trustzone_manager(request),
            Component::AttackPaths => self.attack_paths(request),
            Component::AttackMethods => self.attack_methods(request),
            Component::ThreagileExport => self.threagile_export(request),
            Component::TaraDerive => self.tara_derive(request),
        }
    }

    fn dataflow_editor(&self, request: &ExecuteRequest) -> OpsResult<Value> {
        let component = Component::DataflowEditor;
        let mut doc = otm_of(component, request)?;
        match op_of::<DataflowOp>(component, &request.op)? {
            DataflowOp::Add { dataflow } => doc.add_dataflow(dataflow),
            DataflowOp::Remove { id } => {
                if !doc.remove_dataflow(&id) {
                    debug!("Dataflow {} not present, nothing removed", id);
                }
            }
        }
        Ok(serde_json::to_value(doc)?)
    }

    fn trustzone_manager(&self, request: &ExecuteRequest) -> OpsResult<Value> {
        let component = Component::TrustzoneManager;
        let mut doc = otm_of(component, request)?;
        match op_of::<TrustZoneOp>(component, &request.op)? {
            TrustZoneOp::Add { trust_zone } => doc.add_trust_zone(trust_zone),
            TrustZoneOp::Assign {
                component_id,
                trust_zone_id,
            } => {
                if !doc.assign_trust_zone(&component_id, &trust_zone_id) {
                    debug!("Component {} not present, nothing assigned", component_id);
                }
            }
        }
        Ok(serde_json::to_value(doc)?)
    }

    fn attack_paths(&self, request: &ExecuteRequest) -> OpsResult<Value> {
        let component = Component::AttackPaths;
        let graph = apply_otm(&otm_of(component, request)?);
        let op: AttackPathsOp = op_of(component, &request.op)?;
        let options = AnalyzeOptions {
            k: op.k.unwrap_or(self.config.analysis.k),
            max_depth: op.max_depth.unwrap_or(self.config.analysis.max_depth),
            sources: op.sources,
            targets: op.targets,
        };
        if op.scored {
            let paths = enumerate_scored_paths(&graph, &options, &ImpactLikelihoodScorer);
            Ok(json!({ "paths": paths }))
        } else {
            Ok(json!({ "paths": enumerate_paths(&graph, &options) }))
        }
    }

    fn attack_methods(&self, request: &ExecuteRequest) -> OpsResult<Value> {
        let component = Component::AttackMethods;
        let graph = apply_otm(&otm_of(component, request)?);
        let op: AttackMethodsOp = op_of(component, &request.op)?;
        let options = SuggestOptions {
            k: op.k.unwrap_or(self.config.analysis.k),
            max_depth: op.max_depth.unwrap_or(self.config.analysis.suggest_max_depth),
        };
        let methods = suggest_attack_methods(&graph, &options, &self.catalog);
        Ok(json!({ "methods": methods }))
    }

    fn threagile_export(&self, request: &ExecuteRequest) -> OpsResult<Value> {
        let component = Component::ThreagileExport;
        let doc = otm_of(component, request)?;
        let op: ThreagileExportOp = op_of(component, &request.op)?;
        let title = op.title.unwrap_or_else(|| doc.name.clone());
        let date = op
            .date
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        let options = self.config.threagile_options(title, date);
        let yaml = to_yaml(&build_threagile(&apply_otm(&doc), &options))?;
        Ok(json!({ "yaml": yaml }))
    }

    fn tara_derive(&self, request: &ExecuteRequest) -> OpsResult<Value> {
        let op: TaraDeriveOp = op_of(Component::TaraDerive, &request.op)?;
        Ok(json!({ "rows": apply_tara_derivations(&op.rows) }))
    }
}

fn otm_of(component: Component, request: &ExecuteRequest) -> OpsResult<OtmDocument> {
    let otm = request.otm.clone().ok_or(OpsError::MissingOtm(component))?;
    Ok(parse_otm(otm)?)
}

// A null op stands for "all defaults"
fn op_of<T: DeserializeOwned>(component: Component, op: &Value) -> OpsResult<T> {
    let op = if op.is_null() { json!({}) } else { op.clone() };
    serde_json::from_value(op).map_err(|e| OpsError::InvalidOp {
        component,
        message: e.to_string(),
    })
}
