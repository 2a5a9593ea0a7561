//! In-memory threat graph
//!
//! Holds entities in declaration order (which fixes the enumeration order of
//! every analysis) and flows in insertion order. Trust-boundary containment
//! is derived state, recomputed whenever geometry changes through this API.

use super::entity::Entity;
use super::flow::Flow;
use super::types::{EntityId, EntityKind, FlowId, Position, Size};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during graph construction
#[derive(Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("Entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("Flow {0} not found")]
    FlowNotFound(FlowId),

    #[error("Entity {0} already exists")]
    EntityAlreadyExists(EntityId),

    #[error("Flow {0} already exists")]
    FlowAlreadyExists(FlowId),

    #[error("Invalid flow: source entity {0} does not exist")]
    InvalidFlowSource(EntityId),

    #[error("Invalid flow: target entity {0} does not exist")]
    InvalidFlowTarget(EntityId),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Serializable form of a graph, as handed over by the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub flows: Vec<Flow>,
}

/// The set of entities and flows under analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GraphSnapshot", into = "GraphSnapshot")]
pub struct ThreatGraph {
    entities: IndexMap<EntityId, Entity>,
    flows: Vec<Flow>,
}

impl ThreatGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from an editor snapshot without validation.
    ///
    /// The first entity with a given id wins; flows with dangling endpoints are
    /// kept (analyses skip them). Containment is recomputed.
    pub fn from_parts(entities: Vec<Entity>, flows: Vec<Flow>) -> Self {
        let mut map = IndexMap::with_capacity(entities.len());
        for entity in entities {
            if map.contains_key(&entity.id) {
                debug!("Ignoring duplicate entity {}", entity.id);
                continue;
            }
            map.insert(entity.id.clone(), entity);
        }
        let mut graph = ThreatGraph { entities: map, flows };
        graph.recompute_containment();
        graph
    }

    /// Add an entity, rejecting duplicate ids
    pub fn add_entity(&mut self, entity: Entity) -> GraphResult<()> {
        if self.entities.contains_key(&entity.id) {
            return Err(GraphError::EntityAlreadyExists(entity.id));
        }
        self.entities.insert(entity.id.clone(), entity);
        self.recompute_containment();
        Ok(())
    }

    /// Add a flow whose endpoints must already exist
    pub fn add_flow(&mut self, flow: Flow) -> GraphResult<()> {
        if self.flows.iter().any(|f| f.id == flow.id) {
            return Err(GraphError::FlowAlreadyExists(flow.id));
        }
        if !self.entities.contains_key(&flow.source) {
            return Err(GraphError::InvalidFlowSource(flow.source));
        }
        if !self.entities.contains_key(&flow.target) {
            return Err(GraphError::InvalidFlowTarget(flow.target));
        }
        self.flows.push(flow);
        Ok(())
    }

    /// Remove an entity together with every flow touching it
    pub fn remove_entity(&mut self, id: &str) -> GraphResult<Entity> {
        let entity = self
            .entities
            .shift_remove(id)
            .ok_or_else(|| GraphError::EntityNotFound(EntityId::new(id)))?;
        self.flows
            .retain(|f| f.source.as_str() != id && f.target.as_str() != id);
        self.recompute_containment();
        Ok(entity)
    }

    pub fn remove_flow(&mut self, id: &str) -> GraphResult<Flow> {
        let pos = self
            .flows
            .iter()
            .position(|f| f.id.as_str() == id)
            .ok_or_else(|| GraphError::FlowNotFound(FlowId::new(id)))?;
        Ok(self.flows.remove(pos))
    }

    /// Move an entity and refresh containment
    pub fn move_entity(&mut self, id: &str, position: Position) -> GraphResult<()> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| GraphError::EntityNotFound(EntityId::new(id)))?;
        entity.position = position;
        self.recompute_containment();
        Ok(())
    }

    /// Resize an entity and refresh containment
    pub fn resize_entity(&mut self, id: &str, size: Option<Size>) -> GraphResult<()> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| GraphError::EntityNotFound(EntityId::new(id)))?;
        entity.size = size;
        self.recompute_containment();
        Ok(())
    }

    /// Recompute `contained_node_ids` of every trust boundary from geometry
    pub fn recompute_containment(&mut self) {
        let contained: Vec<(usize, Vec<EntityId>)> = self
            .entities
            .values()
            .enumerate()
            .filter(|(_, e)| e.kind.is_trust_boundary())
            .map(|(idx, boundary)| {
                let ids = self
                    .entities
                    .values()
                    .filter(|other| boundary.contains(other))
                    .map(|other| other.id.clone())
                    .collect();
                (idx, ids)
            })
            .collect();

        for entity in self.entities.values_mut() {
            entity.contained_node_ids.clear();
        }
        for (idx, ids) in contained {
            if let Some((_, boundary)) = self.entities.get_index_mut(idx) {
                boundary.contained_node_ids = ids;
            }
        }
    }

    pub fn get_entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable access for attribute edits; call
    /// [`recompute_containment`](Self::recompute_containment) after touching geometry.
    pub fn get_entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn contains_entity(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Declaration-order position of an entity
    pub fn entity_index(&self, id: &str) -> Option<usize> {
        self.entities.get_index_of(id)
    }

    /// Entity at a declaration-order position
    pub fn entity_at(&self, index: usize) -> Option<&Entity> {
        self.entities.get_index(index).map(|(_, e)| e)
    }

    /// Entities in declaration order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entities_of_kind<'a>(&'a self, kind: &'a EntityKind) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities.values().filter(move |e| &e.kind == kind)
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn get_flow(&self, id: &str) -> Option<&Flow> {
        self.flows.iter().find(|f| f.id.as_str() == id)
    }

    /// Flows whose source and target both resolve
    pub fn valid_flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.iter().filter(move |f| {
            self.entities.contains_key(&f.source) && self.entities.contains_key(&f.target)
        })
    }

    /// Outgoing flows of an entity, in insertion order
    pub fn outgoing_flows<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Flow> + 'a {
        self.flows.iter().filter(move |f| f.source.as_str() == id)
    }

    /// First flow from `source` to `target`, if any
    pub fn flow_between(&self, source: &str, target: &str) -> Option<&Flow> {
        self.flows
            .iter()
            .find(|f| f.source.as_str() == source && f.target.as_str() == target)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            entities: self.entities.values().cloned().collect(),
            flows: self.flows.clone(),
        }
    }
}

impl From<GraphSnapshot> for ThreatGraph {
    fn from(snapshot: GraphSnapshot) -> Self {
        ThreatGraph::from_parts(snapshot.entities, snapshot.flows)
    }
}

impl From<ThreatGraph> for GraphSnapshot {
    fn from(graph: ThreatGraph) -> Self {
        GraphSnapshot {
            entities: graph.entities.into_values().collect(),
            flows: graph.flows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ThreatGraph {
        let mut g = ThreatGraph::new();
        g.add_entity(Entity::new("n_1", "actor").with_label("User").at(10.0, 10.0)).unwrap();
        g.add_entity(Entity::new("n_2", "process").with_label("API").at(100.0, 10.0)).unwrap();
        g.add_entity(Entity::new("n_3", "store").with_label("DB").at(400.0, 10.0)).unwrap();
        g.add_flow(Flow::new("e_1", "n_1", "n_2")).unwrap();
        g.add_flow(Flow::new("e_2", "n_2", "n_3")).unwrap();
        g
    }

    #[test]
    fn test_add_and_lookup() {
        let g = sample();
        assert_eq!(g.entity_count(), 3);
        assert_eq!(g.flow_count(), 2);
        assert_eq!(g.get_entity("n_2").unwrap().display_label(), "API");
        assert_eq!(g.entity_index("n_3"), Some(2));
        assert_eq!(g.outgoing_flows("n_1").count(), 1);
        assert_eq!(g.flow_between("n_2", "n_3").unwrap().id.as_str(), "e_2");
        assert!(g.flow_between("n_3", "n_2").is_none());
    }

    #[test]
    fn test_duplicate_and_invalid() {
        let mut g = sample();
        assert_eq!(
            g.add_entity(Entity::new("n_1", "actor")),
            Err(GraphError::EntityAlreadyExists(EntityId::new("n_1")))
        );
        assert_eq!(
            g.add_flow(Flow::new("e_9", "n_404", "n_1")),
            Err(GraphError::InvalidFlowSource(EntityId::new("n_404")))
        );
        assert_eq!(
            g.add_flow(Flow::new("e_9", "n_1", "n_404")),
            Err(GraphError::InvalidFlowTarget(EntityId::new("n_404")))
        );
        assert_eq!(
            g.add_flow(Flow::new("e_1", "n_1", "n_2")),
            Err(GraphError::FlowAlreadyExists(FlowId::new("e_1")))
        );
    }

    #[test]
    fn test_from_parts_is_lenient() {
        let g = ThreatGraph::from_parts(
            vec![
                Entity::new("n_1", "actor").with_label("first"),
                Entity::new("n_1", "actor").with_label("second"),
            ],
            vec![Flow::new("e_1", "n_1", "ghost")],
        );
        assert_eq!(g.entity_count(), 1);
        assert_eq!(g.get_entity("n_1").unwrap().display_label(), "first");
        assert_eq!(g.flow_count(), 1);
        assert_eq!(g.valid_flows().count(), 0);
    }

    #[test]
    fn test_containment_follows_geometry() {
        let mut g = sample();
        g.add_entity(
            Entity::new("tb_1", "trustBoundary")
                .at(0.0, 0.0)
                .with_size(300.0, 200.0),
        )
        .unwrap();

        let ids: Vec<&str> = g.get_entity("tb_1").unwrap()
            .contained_node_ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["n_1", "n_2"]);

        g.move_entity("n_3", Position::new(50.0, 100.0)).unwrap();
        assert_eq!(g.get_entity("tb_1").unwrap().contained_node_ids.len(), 3);

        g.resize_entity("tb_1", Some(Size::new(60.0, 60.0))).unwrap();
        let ids: Vec<&str> = g.get_entity("tb_1").unwrap()
            .contained_node_ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(ids, vec!["n_1"]);
    }

    #[test]
    fn test_remove_entity_drops_flows() {
        let mut g = sample();
        let removed = g.remove_entity("n_2").unwrap();
        assert_eq!(removed.id.as_str(), "n_2");
        assert_eq!(g.flow_count(), 0);
        assert!(g.remove_entity("n_2").is_err());
        assert!(g.remove_flow("e_1").is_err());
    }

    #[test]
    fn test_snapshot_serde() {
        let g = sample();
        let json = serde_json::to_string(&g).unwrap();
        let back: ThreatGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
        assert_eq!(back.snapshot().entities.len(), 3);
    }
}
