//! Threagile export (write-only)
//!
//! Produces the minimal subset of a Threagile model that strict validators
//! accept: technical assets with their outgoing communication links, and
//! trust boundaries listing the assets they contain.

use super::error::MappingResult;
use crate::graph::{keys, Entity, EntityKind, Flow, ThreatGraph};
use indexmap::IndexMap;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

pub const DEFAULT_THREAGILE_VERSION: &str = "1.0.0";
pub const DEFAULT_BUSINESS_CRITICALITY: &str = "important";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetType {
    ExternalEntity,
    Process,
    Datastore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommunicationLink {
    pub target: String,
    pub protocol: String,
    pub authentication: String,
    pub authorization: String,
    pub usage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechnicalAsset {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub usage: String,
    pub size: String,
    pub technology: String,
    pub internet: bool,
    pub out_of_scope: bool,
    pub encryption: String,
    pub machine: String,
    pub confidentiality: String,
    pub integrity: String,
    pub availability: String,
    /// `None` serializes as `null`; some validators reject an empty map
    pub communication_links: Option<IndexMap<String, CommunicationLink>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreagileTrustBoundary {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub boundary_type: String,
    pub tags: Vec<String>,
    pub technical_assets_inside: Vec<String>,
    pub trust_boundaries_nested: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreagileDocument {
    pub threagile_version: String,
    pub title: String,
    pub date: String,
    pub business_criticality: String,
    pub data_assets: IndexMap<String, Value>,
    pub trust_boundaries: IndexMap<String, ThreagileTrustBoundary>,
    pub technical_assets: IndexMap<String, TechnicalAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreagileOptions {
    pub title: String,
    /// ISO date (`YYYY-MM-DD`) written to the document header
    pub date: String,
    pub version: String,
    pub business_criticality: String,
}

impl ThreagileOptions {
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            version: DEFAULT_THREAGILE_VERSION.to_string(),
            business_criticality: DEFAULT_BUSINESS_CRITICALITY.to_string(),
        }
    }

    /// Options dated with the local calendar day
    pub fn dated_today(title: impl Into<String>) -> Self {
        Self::new(title, chrono::Local::now().format("%Y-%m-%d").to_string())
    }
}

static SEPARATOR_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

/// Lowercase, turn every run of characters outside `[a-z0-9]` (hyphens
/// included) into a single hyphen and trim hyphens from both ends. Empty
/// results become "asset".
pub fn sanitize_id(id: &str) -> String {
    let lowered = id.to_lowercase();
    let replaced = SEPARATOR_RUNS.replace_all(&lowered, "-");
    let trimmed = replaced.trim_matches('-');
    if trimmed.is_empty() {
        "asset".to_string()
    } else {
        trimmed.to_string()
    }
}

fn map_protocol(protocol: Option<&str>) -> String {
    match protocol {
        None => "https".to_string(),
        Some("HTTP") => "http".to_string(),
        Some("HTTPS") => "https".to_string(),
        Some(p) if p.trim().is_empty() => "unknown-protocol".to_string(),
        Some(p) => p.to_string(),
    }
}

fn map_authentication(authentication: Option<&str>) -> &'static str {
    match authentication.unwrap_or("token") {
        "none" => "none",
        "basic" => "credentials",
        "token" => "token",
        "mtls" => "client-certificate",
        _ => "none",
    }
}

fn map_boundary_type(boundary_type: Option<&str>) -> &'static str {
    match boundary_type.unwrap_or("network") {
        "privilege" => "execution-environment",
        "tenant" => "network-policy-namespace-isolation",
        _ => "network-cloud-security-group",
    }
}

/// Sanitized, collision-free ids for every entity with a kind, in
/// declaration order
fn assign_ids(graph: &ThreatGraph) -> FxHashMap<&str, String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut ids = FxHashMap::default();
    for entity in graph.entities().filter(|e| !e.kind.is_unset()) {
        let base = sanitize_id(entity.id.as_str());
        let mut candidate = base.clone();
        let mut counter = 1;
        while used.contains(&candidate) {
            candidate = format!("{}-{}", base, counter);
            counter += 1;
        }
        used.insert(candidate.clone());
        ids.insert(entity.id.as_str(), candidate);
    }
    ids
}

fn technical_asset(entity: &Entity, id: &str) -> TechnicalAsset {
    let (asset_type, technology) = match &entity.kind {
        EntityKind::Actor => (AssetType::ExternalEntity, "client-system".to_string()),
        EntityKind::Store => (AssetType::Datastore, "database".to_string()),
        _ => (
            AssetType::Process,
            entity.technology().unwrap_or("web-application").to_string(),
        ),
    };
    TechnicalAsset {
        id: id.to_string(),
        description: entity.label().unwrap_or(entity.id.as_str()).to_string(),
        asset_type,
        usage: "business".to_string(),
        size: "application".to_string(),
        technology,
        internet: yes(entity, keys::PUBLIC_NETWORK),
        out_of_scope: yes(entity, keys::OUT_OF_SCOPE),
        encryption: "none".to_string(),
        machine: "virtual".to_string(),
        confidentiality: "internal".to_string(),
        integrity: "important".to_string(),
        availability: "important".to_string(),
        communication_links: None,
    }
}

// Only the literal "yes" sets these Threagile flags
fn yes(entity: &Entity, key: &str) -> bool {
    entity.attributes.get(key).and_then(Value::as_str) == Some("yes")
}

fn communication_link(flow: &Flow, target: &str) -> CommunicationLink {
    CommunicationLink {
        target: target.to_string(),
        protocol: map_protocol(flow.protocol()),
        authentication: map_authentication(flow.authentication()).to_string(),
        authorization: "none".to_string(),
        usage: "business".to_string(),
    }
}

/// Map a graph to a Threagile document
pub fn build_threagile(graph: &ThreatGraph, options: &ThreagileOptions) -> ThreagileDocument {
    let ids = assign_ids(graph);
    let mut assets: IndexMap<String, TechnicalAsset> = IndexMap::new();
    let mut boundaries: IndexMap<String, ThreagileTrustBoundary> = IndexMap::new();

    for entity in graph.entities() {
        let Some(sid) = ids.get(entity.id.as_str()) else {
            continue;
        };
        if entity.kind.is_trust_boundary() {
            continue;
        }
        assets.insert(sid.clone(), technical_asset(entity, sid));
    }

    // Boundaries list only contained entities that became assets
    for boundary in graph.entities_of_kind(&EntityKind::TrustBoundary) {
        let Some(sid) = ids.get(boundary.id.as_str()) else {
            continue;
        };
        let inside = boundary
            .contained_node_ids
            .iter()
            .filter_map(|id| ids.get(id.as_str()))
            .filter(|sid| assets.contains_key(sid.as_str()))
            .cloned()
            .collect();
        boundaries.insert(
            sid.clone(),
            ThreagileTrustBoundary {
                id: sid.clone(),
                description: boundary.label().unwrap_or("Trust Boundary").to_string(),
                boundary_type: map_boundary_type(
                    boundary.attributes.get(keys::BOUNDARY_TYPE).and_then(Value::as_str),
                )
                .to_string(),
                tags: Vec::new(),
                technical_assets_inside: inside,
                trust_boundaries_nested: Vec::new(),
            },
        );
    }

    let mut links = 0usize;
    for flow in graph.flows() {
        let (Some(src), Some(dst)) = (ids.get(flow.source.as_str()), ids.get(flow.target.as_str())) else {
            continue;
        };
        if !assets.contains_key(dst.as_str()) {
            continue;
        }
        let Some(asset) = assets.get_mut(src.as_str()) else {
            continue;
        };
        let key = format!("link-{}-{}", src, dst);
        asset
            .communication_links
            .get_or_insert_with(IndexMap::new)
            .insert(key, communication_link(flow, dst));
        links += 1;
    }
    debug!(
        assets = assets.len(),
        boundaries = boundaries.len(),
        links,
        "Built Threagile model"
    );

    ThreagileDocument {
        threagile_version: options.version.clone(),
        title: options.title.clone(),
        date: options.date.clone(),
        business_criticality: options.business_criticality.clone(),
        data_assets: IndexMap::new(),
        trust_boundaries: boundaries,
        technical_assets: assets,
    }
}

pub fn to_yaml(doc: &ThreagileDocument) -> MappingResult<String> {
    Ok(serde_yaml::to_string(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ThreagileOptions {
        ThreagileOptions::new("Model", "2024-05-01")
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("n_1"), "n-1");
        assert_eq!(sanitize_id("  Web Server!! "), "web-server");
        assert_eq!(sanitize_id("a--b__c"), "a-b-c");
        assert_eq!(sanitize_id("___"), "asset");
        assert_eq!(sanitize_id(""), "asset");
    }

    #[test]
    fn test_id_collisions_get_counters() {
        let graph = ThreatGraph::from_parts(
            vec![
                Entity::new("n_1", EntityKind::Process),
                Entity::new("n-1", EntityKind::Process),
                Entity::new("N 1", EntityKind::Store),
                Entity::new("untyped", EntityKind::Unset),
            ],
            vec![],
        );
        let doc = build_threagile(&graph, &options());
        let keys: Vec<&str> = doc.technical_assets.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["n-1", "n-1-1", "n-1-2"]);
        assert_eq!(doc.technical_assets["n-1-2"].asset_type, AssetType::Datastore);
    }

    #[test]
    fn test_asset_defaults_and_flags() {
        let graph = ThreatGraph::from_parts(
            vec![
                Entity::new("user", EntityKind::Actor).with_attribute(keys::PUBLIC_NETWORK, "yes"),
                Entity::new("svc", EntityKind::Process).with_label("Service"),
                Entity::new("svc2", EntityKind::Process)
                    .with_technology("web-service-rest")
                    .with_attribute(keys::OUT_OF_SCOPE, "yes"),
                Entity::new("db", EntityKind::Store).with_technology("postgres"),
            ],
            vec![],
        );
        let doc = build_threagile(&graph, &options());
        let user = &doc.technical_assets["user"];
        assert_eq!(user.asset_type, AssetType::ExternalEntity);
        assert_eq!(user.technology, "client-system");
        assert!(user.internet);
        assert_eq!(user.description, "user");
        let svc = &doc.technical_assets["svc"];
        assert_eq!(svc.technology, "web-application");
        assert_eq!(svc.description, "Service");
        assert!(!svc.internet && !svc.out_of_scope);
        assert_eq!(doc.technical_assets["svc2"].technology, "web-service-rest");
        assert!(doc.technical_assets["svc2"].out_of_scope);
        assert_eq!(doc.technical_assets["db"].technology, "database");
        assert!(doc.technical_assets.values().all(|a| a.communication_links.is_none()));
    }

    #[test]
    fn test_links_and_lookup_tables() {
        let graph = ThreatGraph::from_parts(
            vec![
                Entity::new("a", EntityKind::Actor),
                Entity::new("b", EntityKind::Process),
                Entity::new("c", EntityKind::Store),
            ],
            vec![
                Flow::new("f1", "a", "b").with_protocol("HTTP").with_authentication("basic"),
                Flow::new("f2", "b", "c").with_protocol("jdbc").with_authentication("kerberos"),
                Flow::new("f3", "a", "c"),
                Flow::new("f4", "c", "a").with_protocol("").with_authentication("mtls"),
                Flow::new("f5", "a", "ghost"),
            ],
        );
        let doc = build_threagile(&graph, &options());
        let a_links = doc.technical_assets["a"].communication_links.as_ref().unwrap();
        assert_eq!(a_links.len(), 2);
        let ab = &a_links["link-a-b"];
        assert_eq!(ab.target, "b");
        assert_eq!(ab.protocol, "http");
        assert_eq!(ab.authentication, "credentials");
        let ac = &a_links["link-a-c"];
        assert_eq!(ac.protocol, "https");
        assert_eq!(ac.authentication, "token");

        let bc = &doc.technical_assets["b"].communication_links.as_ref().unwrap()["link-b-c"];
        assert_eq!(bc.protocol, "jdbc");
        assert_eq!(bc.authentication, "none");

        let ca = &doc.technical_assets["c"].communication_links.as_ref().unwrap()["link-c-a"];
        assert_eq!(ca.protocol, "unknown-protocol");
        assert_eq!(ca.authentication, "client-certificate");
    }

    #[test]
    fn test_trust_boundaries() {
        let graph = ThreatGraph::from_parts(
            vec![
                Entity::new("vpc", EntityKind::TrustBoundary)
                    .with_attribute(keys::BOUNDARY_TYPE, "privilege")
                    .with_size(500.0, 500.0),
                Entity::new("inner", EntityKind::TrustBoundary).with_label("Inner").at(10.0, 10.0),
                Entity::new("app_1", EntityKind::Process).at(50.0, 50.0),
                Entity::new("outside", EntityKind::Actor).at(900.0, 900.0),
            ],
            vec![Flow::new("f", "app_1", "inner")],
        );
        let doc = build_threagile(&graph, &options());
        assert!(!doc.technical_assets.contains_key("vpc"));
        let vpc = &doc.trust_boundaries["vpc"];
        assert_eq!(vpc.boundary_type, "execution-environment");
        assert_eq!(vpc.description, "Trust Boundary");
        assert_eq!(vpc.technical_assets_inside, vec!["app-1"]);
        assert_eq!(doc.trust_boundaries["inner"].boundary_type, "network-cloud-security-group");
        // Links never point at a boundary
        assert!(doc.technical_assets["app-1"].communication_links.is_none());
    }

    #[test]
    fn test_yaml_shape() {
        let graph = ThreatGraph::from_parts(
            vec![Entity::new("a", EntityKind::Actor), Entity::new("b", EntityKind::Store)],
            vec![Flow::new("f", "a", "b")],
        );
        let yaml = to_yaml(&build_threagile(&graph, &options())).unwrap();
        assert!(yaml.starts_with("threagile_version:"));
        assert!(yaml.contains("data_assets: {}"));
        assert!(yaml.contains("trust_boundaries: {}"));
        assert!(yaml.contains("type: external-entity"));
        assert!(yaml.contains("communication_links: null"));
        assert!(yaml.contains("link-a-b:"));

        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed["threagile_version"], serde_yaml::Value::from("1.0.0"));
        assert_eq!(parsed["date"], serde_yaml::Value::from("2024-05-01"));
        assert_eq!(parsed["business_criticality"], serde_yaml::Value::from("important"));
        assert_eq!(parsed["technical_assets"]["a"]["communication_links"]["link-a-b"]["target"], serde_yaml::Value::from("b"));
        assert!(parsed["technical_assets"]["b"]["communication_links"].is_null());
    }
}
