//! Entities: actors, processes, stores and trust boundaries

use super::property::{is_truthy_flag, lenient_text, PropertyMap};
use super::types::{EntityId, EntityKind, Position, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute keys with analysis meaning
pub mod keys {
    pub const IS_ENTRY: &str = "isEntry";
    pub const IS_TARGET: &str = "isTarget";
    pub const CONTAINS_PII: &str = "containsPII";
    pub const PROVIDES_AUTHENTICATION: &str = "providesAuthentication";
    pub const PUBLIC_NETWORK: &str = "publicNetwork";
    pub const OUT_OF_SCOPE: &str = "out_of_scope";
    pub const IMPACT: &str = "impact";
    pub const BOUNDARY_TYPE: &str = "boundaryType";
}

/// Typed entity attributes
///
/// `label` and `technology` are read by every analysis; the rest of the
/// editor's attributes ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub technology: Option<String>,

    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl EntityAttributes {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.extra.insert(key.into(), value.into());
    }

    pub fn flag(&self, key: &str) -> bool {
        is_truthy_flag(self.extra.get(key))
    }
}

/// A node in the threat graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,

    #[serde(default)]
    pub kind: EntityKind,

    #[serde(default)]
    pub position: Position,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    #[serde(default)]
    pub attributes: EntityAttributes,

    /// Entities whose center lies inside this trust boundary.
    ///
    /// Derived from geometry by [`ThreatGraph::recompute_containment`](super::ThreatGraph::recompute_containment);
    /// always empty for other kinds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contained_node_ids: Vec<EntityId>,
}

impl Entity {
    /// Create an entity at the origin with no attributes
    pub fn new(id: impl Into<EntityId>, kind: impl Into<EntityKind>) -> Self {
        Entity {
            id: id.into(),
            kind: kind.into(),
            position: Position::default(),
            size: None,
            attributes: EntityAttributes::default(),
            contained_node_ids: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.attributes.label = Some(label.into());
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.attributes.technology = Some(technology.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.set(key, value);
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    /// Non-blank label, if any
    pub fn label(&self) -> Option<&str> {
        self.attributes
            .label
            .as_deref()
            .filter(|l| !l.trim().is_empty())
    }

    /// Non-blank technology tag, if any
    pub fn technology(&self) -> Option<&str> {
        self.attributes
            .technology
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    /// Human-readable name: label, else technology, else kind, else id
    pub fn display_label(&self) -> &str {
        self.label()
            .or_else(|| self.technology())
            .or_else(|| Some(self.kind.as_str()).filter(|k| !k.is_empty()))
            .unwrap_or_else(|| self.id.as_str())
    }

    /// Lowercased technology tag, falling back to the label
    pub fn tech_tag(&self) -> String {
        self.technology()
            .or_else(|| self.label())
            .unwrap_or_default()
            .to_lowercase()
    }

    pub fn flag(&self, key: &str) -> bool {
        self.attributes.flag(key)
    }

    /// Size actually occupied on the canvas; kind defaults when unsized
    pub fn effective_size(&self) -> Size {
        if let Some(size) = self.size.filter(|s| s.width > 0.0 && s.height > 0.0) {
            return size;
        }
        match self.kind {
            EntityKind::Actor => Size::new(64.0, 64.0),
            EntityKind::Process => Size::new(120.0, 60.0),
            EntityKind::Store => Size::new(120.0, 70.0),
            EntityKind::TrustBoundary => Size::new(260.0, 160.0),
            _ => Size::new(100.0, 60.0),
        }
    }

    /// Geometric center
    pub fn center(&self) -> Position {
        let size = self.effective_size();
        Position::new(
            self.position.x + size.width / 2.0,
            self.position.y + size.height / 2.0,
        )
    }

    /// Whether `other`'s center falls inside this entity's rectangle (edges inclusive).
    ///
    /// Only trust boundaries contain anything, and never another trust boundary.
    pub fn contains(&self, other: &Entity) -> bool {
        if !self.kind.is_trust_boundary() || other.kind.is_trust_boundary() {
            return false;
        }
        let size = self.effective_size();
        let c = other.center();
        c.x >= self.position.x
            && c.x <= self.position.x + size.width
            && c.y >= self.position.y
            && c.y <= self.position.y + size.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_label_precedence() {
        let e = Entity::new("n_1", "store");
        assert_eq!(e.display_label(), "store");

        let e = e.with_technology("sqlite");
        assert_eq!(e.display_label(), "sqlite");

        let e = e.with_label("Customer DB");
        assert_eq!(e.display_label(), "Customer DB");

        let blank = Entity::new("n_2", "").with_label("   ");
        assert_eq!(blank.display_label(), "n_2");
    }

    #[test]
    fn test_tech_tag_falls_back_to_label() {
        let e = Entity::new("n_1", "actor").with_label("UART Console");
        assert_eq!(e.tech_tag(), "uart console");
        let e = e.with_technology("BLE");
        assert_eq!(e.tech_tag(), "ble");
    }

    #[test]
    fn test_default_sizes() {
        assert_eq!(Entity::new("a", "actor").effective_size(), Size::new(64.0, 64.0));
        assert_eq!(Entity::new("b", "trustBoundary").effective_size(), Size::new(260.0, 160.0));
        assert_eq!(Entity::new("c", "widget").effective_size(), Size::new(100.0, 60.0));
        assert_eq!(
            Entity::new("d", "store").with_size(10.0, 20.0).effective_size(),
            Size::new(10.0, 20.0)
        );
    }

    #[test]
    fn test_containment_by_center() {
        let boundary = Entity::new("tb", "trustBoundary").at(0.0, 0.0).with_size(200.0, 100.0);
        // center at (60, 30)
        let inside = Entity::new("p", "process").at(0.0, 0.0);
        // center at (232, 32)
        let outside = Entity::new("a", "actor").at(200.0, 0.0);
        // center exactly on the right edge: (200, 50)
        let on_edge = Entity::new("s", "store").at(140.0, 15.0);
        let nested = Entity::new("tb2", "trustBoundary").at(10.0, 10.0).with_size(20.0, 20.0);

        assert!(boundary.contains(&inside));
        assert!(!boundary.contains(&outside));
        assert!(boundary.contains(&on_edge));
        assert!(!boundary.contains(&nested));
        assert!(!inside.contains(&outside));
    }

    #[test]
    fn test_serde_shape() {
        let e = Entity::new("n_1", "actor")
            .with_label("UART")
            .with_attribute("isEntry", "yes")
            .at(10.0, 20.0);
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["kind"], json!("actor"));
        assert_eq!(v["attributes"]["label"], json!("UART"));
        assert_eq!(v["attributes"]["isEntry"], json!("yes"));
        assert!(v.get("size").is_none());

        let back: Entity = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
        assert!(back.flag(keys::IS_ENTRY));
    }

    #[test]
    fn test_lenient_label() {
        let e: Entity = serde_json::from_value(json!({
            "id": "n_9",
            "attributes": { "label": 42 }
        }))
        .unwrap();
        assert_eq!(e.label(), Some("42"));
        assert!(e.kind.is_unset());
    }
}
