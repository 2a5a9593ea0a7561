//! Open Threat Model mapping
//!
//! Export writes a skeletal OTM view (components, dataflows, trust zones) plus
//! the complete layout under `extensions["x-threatflow"].layout`. Import treats
//! that layout as authoritative and falls back to the skeletal records for
//! anything it does not cover.

use super::error::{MappingError, MappingResult};
use crate::graph::{
    keys, Entity, EntityAttributes, EntityId, EntityKind, Flow, FlowAttributes, FlowId, PropertyMap, Position,
    Size, ThreatGraph,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

pub const LAYOUT_EXTENSION: &str = "x-threatflow";
pub const DEFAULT_OTM_VERSION: &str = "0.1";
pub const DEFAULT_MODEL_NAME: &str = "Model";

const SKELETAL_BOUNDARY: Size = Size {
    width: 260.0,
    height: 160.0,
};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtmComponent {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtmDataflow {
    pub id: String,
    pub source: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(flatten)]
    pub extra: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtmTrustZone {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub zone_type: Option<String>,
    #[serde(flatten)]
    pub extra: PropertyMap,
}

/// Layout record of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: EntityId,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: EntityKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub props: EntityAttributes,
}

/// Layout record of one flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: FlowId,
    pub source: EntityId,
    pub target: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub props: FlowAttributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    /// Absent in hand-edited documents; dataflows are used instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edges: Option<Vec<LayoutEdge>>,
}

impl From<&Entity> for LayoutNode {
    fn from(entity: &Entity) -> Self {
        LayoutNode {
            id: entity.id.clone(),
            x: Some(entity.position.x),
            y: Some(entity.position.y),
            width: entity.size.map(|s| s.width),
            height: entity.size.map(|s| s.height),
            kind: entity.kind.clone(),
            props: entity.attributes.clone(),
        }
    }
}

impl From<LayoutNode> for Entity {
    fn from(node: LayoutNode) -> Self {
        let mut entity = Entity::new(node.id, node.kind);
        entity.position = Position::new(node.x.unwrap_or(0.0), node.y.unwrap_or(0.0));
        entity.size = match (node.width, node.height) {
            (Some(width), Some(height)) => Some(Size::new(width, height)),
            _ => None,
        };
        entity.attributes = node.props;
        entity
    }
}

impl From<&Flow> for LayoutEdge {
    fn from(flow: &Flow) -> Self {
        LayoutEdge {
            id: flow.id.clone(),
            source: flow.source.clone(),
            target: flow.target.clone(),
            props: flow.attributes.clone(),
        }
    }
}

impl From<LayoutEdge> for Flow {
    fn from(edge: LayoutEdge) -> Self {
        let mut flow = Flow::new(edge.id, edge.source, edge.target);
        flow.attributes = edge.props;
        flow
    }
}

impl From<&OtmDataflow> for Flow {
    fn from(dataflow: &OtmDataflow) -> Self {
        let flow = Flow::new(
            dataflow.id.as_str(),
            dataflow.source.as_str(),
            dataflow.destination.as_str(),
        );
        match &dataflow.protocol {
            Some(protocol) => flow.with_protocol(protocol.clone()),
            None => flow,
        }
    }
}

impl OtmComponent {
    fn skeletal_entity(&self) -> Entity {
        Entity::new(self.id.as_str(), self.component_type.as_str()).with_label(self.name.clone())
    }
}

impl OtmTrustZone {
    fn skeletal_entity(&self) -> Entity {
        let mut entity = Entity::new(self.id.as_str(), EntityKind::TrustBoundary)
            .with_label(self.name.clone())
            .with_size(SKELETAL_BOUNDARY.width, SKELETAL_BOUNDARY.height);
        if let Some(zone_type) = &self.zone_type {
            entity.attributes.set(keys::BOUNDARY_TYPE, zone_type.clone());
        }
        entity
    }
}

/// An OTM document. Sections this crate does not model (projects, threats,
/// mitigations, risks, ...) are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtmDocument {
    pub otm_version: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<OtmComponent>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dataflows: Vec<OtmDataflow>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trust_zones: Vec<OtmTrustZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl OtmDocument {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> MappingResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        parse_otm(value)
    }

    pub fn to_json_pretty(&self) -> MappingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The embedded layout, if present and well-formed
    pub fn layout(&self) -> Option<Layout> {
        let raw = self.extensions.as_ref()?.get(LAYOUT_EXTENSION)?.get("layout")?;
        match serde_json::from_value(raw.clone()) {
            Ok(layout) => Some(layout),
            Err(e) => {
                warn!("Ignoring malformed {} layout: {}", LAYOUT_EXTENSION, e);
                None
            }
        }
    }

    fn layout_array_mut(&mut self, section: &str) -> Option<&mut Vec<Value>> {
        self.extensions
            .as_mut()?
            .get_mut(LAYOUT_EXTENSION)?
            .get_mut("layout")?
            .get_mut(section)?
            .as_array_mut()
    }

    /// Append a dataflow, mirroring it into the layout edges when they exist
    pub fn add_dataflow(&mut self, dataflow: OtmDataflow) {
        if let Some(edges) = self.layout_array_mut("edges") {
            let props = match &dataflow.protocol {
                Some(protocol) => json!({ "protocol": protocol }),
                None => json!({}),
            };
            edges.push(json!({
                "id": dataflow.id,
                "source": dataflow.source,
                "target": dataflow.destination,
                "props": props,
            }));
        }
        self.dataflows.push(dataflow);
    }

    /// Remove a dataflow and its layout edge; returns whether anything was removed
    pub fn remove_dataflow(&mut self, id: &str) -> bool {
        let before = self.dataflows.len();
        self.dataflows.retain(|d| d.id != id);
        let mut removed = self.dataflows.len() != before;
        if let Some(edges) = self.layout_array_mut("edges") {
            let before = edges.len();
            edges.retain(|e| e.get("id").and_then(Value::as_str) != Some(id));
            removed |= edges.len() != before;
        }
        removed
    }

    pub fn add_trust_zone(&mut self, zone: OtmTrustZone) {
        self.trust_zones.push(zone);
    }

    /// Point the first component with `component_id` at a trust zone
    pub fn assign_trust_zone(&mut self, component_id: &str, trust_zone_id: &str) -> bool {
        match self.components.iter_mut().find(|c| c.id == component_id) {
            Some(component) => {
                component.trust_zone = Some(trust_zone_id.to_string());
                true
            }
            None => false,
        }
    }
}

/// Validate the required shape of an OTM value and deserialize it.
///
/// `otmVersion` and `name` are required; `components`, `dataflows` and
/// `trustZones` must be arrays when present.
pub fn parse_otm(value: Value) -> MappingResult<OtmDocument> {
    let object = value.as_object().ok_or(MappingError::NotAnObject)?;
    for field in ["otmVersion", "name"] {
        if object.get(field).map_or(true, Value::is_null) {
            return Err(MappingError::MissingField(field));
        }
    }
    for field in ["components", "dataflows", "trustZones"] {
        if let Some(section) = object.get(field) {
            if !section.is_null() && !section.is_array() {
                return Err(MappingError::NotAnArray(field));
            }
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Options for [`build_otm`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtmOptions {
    pub name: String,
    pub version: String,
}

impl Default for OtmOptions {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            version: DEFAULT_OTM_VERSION.to_string(),
        }
    }
}

impl OtmOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Export a graph as an OTM document with embedded layout
pub fn build_otm(graph: &ThreatGraph, options: &OtmOptions) -> MappingResult<OtmDocument> {
    let zone_of = |id: &EntityId| {
        graph
            .entities_of_kind(&EntityKind::TrustBoundary)
            .find(|b| b.contained_node_ids.contains(id))
            .map(|b| b.id.to_string())
    };

    let components = graph
        .entities()
        .filter(|e| e.kind.is_component())
        .map(|e| OtmComponent {
            id: e.id.to_string(),
            name: e.label().unwrap_or(e.id.as_str()).to_string(),
            component_type: e.kind.to_string(),
            trust_zone: zone_of(&e.id),
            tags: Vec::new(),
            extra: PropertyMap::new(),
        })
        .collect();

    let dataflows = graph
        .flows()
        .iter()
        .map(|f| OtmDataflow {
            id: f.id.to_string(),
            source: f.source.to_string(),
            destination: f.target.to_string(),
            protocol: f.protocol().map(str::to_string),
            extra: PropertyMap::new(),
        })
        .collect();

    let trust_zones = graph
        .entities_of_kind(&EntityKind::TrustBoundary)
        .map(|e| OtmTrustZone {
            id: e.id.to_string(),
            name: e.label().unwrap_or("Trust Boundary").to_string(),
            zone_type: e.attributes.get(keys::BOUNDARY_TYPE).and_then(Value::as_str).map(str::to_string),
            extra: PropertyMap::new(),
        })
        .collect();

    let layout = Layout {
        nodes: graph.entities().map(LayoutNode::from).collect(),
        edges: Some(graph.flows().iter().map(LayoutEdge::from).collect()),
    };
    let mut extensions = Map::new();
    extensions.insert(
        LAYOUT_EXTENSION.to_string(),
        json!({ "layout": serde_json::to_value(&layout)? }),
    );

    Ok(OtmDocument {
        otm_version: options.version.clone(),
        name: options.name.clone(),
        components,
        dataflows,
        trust_zones,
        extensions: Some(extensions),
        extra: PropertyMap::new(),
    })
}

/// Rebuild a graph from an OTM document
pub fn apply_otm(doc: &OtmDocument) -> ThreatGraph {
    let (entities, flows) = match doc.layout() {
        Some(layout) => from_layout(doc, layout),
        None => {
            debug!(
                components = doc.components.len(),
                dataflows = doc.dataflows.len(),
                "No layout extension, reconstructing skeletal graph"
            );
            let mut entities: Vec<Entity> = doc.components.iter().map(OtmComponent::skeletal_entity).collect();
            entities.extend(doc.trust_zones.iter().map(OtmTrustZone::skeletal_entity));
            (entities, doc.dataflows.iter().map(Flow::from).collect())
        }
    };
    ThreatGraph::from_parts(entities, flows)
}

fn from_layout(doc: &OtmDocument, layout: Layout) -> (Vec<Entity>, Vec<Flow>) {
    let known: HashSet<EntityId> = layout.nodes.iter().map(|n| n.id.clone()).collect();
    let mut entities: Vec<Entity> = layout.nodes.into_iter().map(Entity::from).collect();

    for component in doc.components.iter().filter(|c| !known.contains(c.id.as_str())) {
        warn!("Component {} has no layout entry, using skeletal record", component.id);
        entities.push(component.skeletal_entity());
    }
    for zone in doc.trust_zones.iter().filter(|z| !known.contains(z.id.as_str())) {
        warn!("Trust zone {} has no layout entry, using skeletal record", zone.id);
        entities.push(zone.skeletal_entity());
    }

    let flows = match layout.edges {
        Some(edges) => edges.into_iter().map(Flow::from).collect(),
        None => {
            warn!("Layout has no edges, using dataflows");
            doc.dataflows.iter().map(Flow::from).collect()
        }
    };
    (entities, flows)
}
