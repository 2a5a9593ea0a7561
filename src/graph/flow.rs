//! Flows: directed data or attack transitions between entities

use super::property::{is_truthy_flag, lenient_text, PropertyMap};
use super::types::{EntityId, FlowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed flow attributes; everything else stays in `extra`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub protocol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_text")]
    pub authentication: Option<String>,

    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl FlowAttributes {
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

/// A directed edge in the threat graph
///
/// Exactly one source and one target. Self-loops are allowed; flows whose
/// endpoints do not resolve are kept but ignored by every analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: FlowId,

    /// Source entity (flow goes FROM this entity)
    pub source: EntityId,

    /// Target entity (flow goes TO this entity)
    pub target: EntityId,

    #[serde(default)]
    pub attributes: FlowAttributes,
}

impl Flow {
    pub fn new(
        id: impl Into<FlowId>,
        source: impl Into<EntityId>,
        target: impl Into<EntityId>,
    ) -> Self {
        Flow {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            attributes: FlowAttributes::default(),
        }
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.attributes.protocol = Some(protocol.into());
        self
    }

    pub fn with_authentication(mut self, authentication: impl Into<String>) -> Self {
        self.attributes.authentication = Some(authentication.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.set(key, value);
        self
    }

    pub fn protocol(&self) -> Option<&str> {
        self.attributes.protocol.as_deref()
    }

    pub fn authentication(&self) -> Option<&str> {
        self.attributes.authentication.as_deref()
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let flow = Flow::new("e_1", "n_1", "n_2")
            .with_protocol("HTTPS")
            .with_authentication("mtls")
            .with_attribute("likelihood", 4);
        assert_eq!(flow.protocol(), Some("HTTPS"));
        assert_eq!(flow.authentication(), Some("mtls"));
        assert_eq!(flow.attributes.get("likelihood"), Some(&json!(4)));
        assert!(!flow.is_self_loop());
        assert!(Flow::new("e_2", "n_1", "n_1").is_self_loop());
    }

    #[test]
    fn test_serde_preserves_extra() {
        let raw = json!({
            "id": "e_1",
            "source": "n_1",
            "target": "n_2",
            "attributes": { "protocol": "MQTT", "encrypted": true, "publicNetwork": "yes" }
        });
        let flow: Flow = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(flow.protocol(), Some("MQTT"));
        assert!(flow.attributes.flag("publicNetwork"));
        assert!(flow.attributes.flag("encrypted"));
        assert_eq!(serde_json::to_value(&flow).unwrap(), raw);
    }
}
