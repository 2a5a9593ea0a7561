//! Path scoring strategies
//!
//! Ranking is pluggable: any [`PathScorer`] works as long as a path never
//! scores lower when an entity's impact or a flow's likelihood goes up.

use super::paths::AttackPath;
use crate::graph::{keys, Entity, EntityKind, Flow, ThreatGraph};
use crate::graph::property::rating_1_to_5;

/// Ranks candidate attack paths; higher is more attacker-favorable.
pub trait PathScorer: Send + Sync {
    fn score(&self, graph: &ThreatGraph, path: &AttackPath) -> f64;
}

impl<F> PathScorer for F
where
    F: Fn(&ThreatGraph, &AttackPath) -> f64 + Send + Sync,
{
    fn score(&self, graph: &ThreatGraph, path: &AttackPath) -> f64 {
        self(graph, path)
    }
}

/// Built-in scorer: sum over hops of `impact(next entity) * likelihood(flow)`.
///
/// Impact and likelihood are 1..=5. Explicit `impact`/`likelihood`
/// attributes win; otherwise they are estimated from kind, `containsPII`,
/// `publicNetwork` and the protocol. Hops without a resolvable flow add
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpactLikelihoodScorer;

impl ImpactLikelihoodScorer {
    pub fn impact(entity: &Entity) -> u8 {
        if let Some(explicit) = rating_1_to_5(entity.attributes.get(keys::IMPACT)) {
            return explicit;
        }
        match entity.kind {
            EntityKind::Store if entity.flag(keys::CONTAINS_PII) => 5,
            EntityKind::Store | EntityKind::Process => 3,
            _ => 2,
        }
    }

    pub fn likelihood(flow: &Flow) -> u8 {
        if let Some(explicit) = rating_1_to_5(flow.attributes.get("likelihood")) {
            return explicit;
        }
        if flow.attributes.flag(keys::PUBLIC_NETWORK) {
            return 4;
        }
        let protocol = flow.protocol().unwrap_or_default().to_lowercase();
        if protocol.contains("http") && !protocol.contains("https") {
            4
        } else if protocol.contains("mqtt") || protocol.contains("ws") {
            3
        } else {
            2
        }
    }
}

impl PathScorer for ImpactLikelihoodScorer {
    fn score(&self, graph: &ThreatGraph, path: &AttackPath) -> f64 {
        path.node_ids
            .windows(2)
            .filter_map(|hop| {
                let next = graph.get_entity(hop[1].as_str())?;
                let flow = graph.flow_between(hop[0].as_str(), hop[1].as_str())?;
                Some(Self::impact(next) as f64 * Self::likelihood(flow) as f64)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EntityId;

    #[test]
    fn test_impact_estimates() {
        assert_eq!(ImpactLikelihoodScorer::impact(&Entity::new("s", "store")), 3);
        assert_eq!(
            ImpactLikelihoodScorer::impact(&Entity::new("s", "store").with_attribute("containsPII", "yes")),
            5
        );
        assert_eq!(ImpactLikelihoodScorer::impact(&Entity::new("a", "actor")), 2);
        assert_eq!(
            ImpactLikelihoodScorer::impact(&Entity::new("a", "actor").with_attribute("impact", "4")),
            4
        );
        // out of range falls back to the estimate
        assert_eq!(
            ImpactLikelihoodScorer::impact(&Entity::new("p", "process").with_attribute("impact", 7)),
            3
        );
    }

    #[test]
    fn test_likelihood_estimates() {
        let f = |p: &str| Flow::new("e", "a", "b").with_protocol(p);
        assert_eq!(ImpactLikelihoodScorer::likelihood(&f("HTTP")), 4);
        assert_eq!(ImpactLikelihoodScorer::likelihood(&f("HTTPS")), 2);
        assert_eq!(ImpactLikelihoodScorer::likelihood(&f("mqtt")), 3);
        assert_eq!(ImpactLikelihoodScorer::likelihood(&f("wss")), 3);
        assert_eq!(ImpactLikelihoodScorer::likelihood(&Flow::new("e", "a", "b")), 2);
        assert_eq!(
            ImpactLikelihoodScorer::likelihood(
                &Flow::new("e", "a", "b").with_attribute("publicNetwork", "yes")
            ),
            4
        );
        assert_eq!(
            ImpactLikelihoodScorer::likelihood(&f("HTTPS").with_attribute("likelihood", 5)),
            5
        );
    }

    #[test]
    fn test_monotonic_in_likelihood() {
        let make = |likelihood: i64| {
            ThreatGraph::from_parts(
                vec![Entity::new("a", "actor"), Entity::new("s", "store")],
                vec![Flow::new("e", "a", "s").with_attribute("likelihood", likelihood)],
            )
        };
        let path = AttackPath {
            node_ids: vec![EntityId::new("a"), EntityId::new("s")],
            labels: vec!["actor".into(), "store".into()],
        };
        let mut last = 0.0;
        for l in 1..=5 {
            let score = ImpactLikelihoodScorer.score(&make(l), &path);
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn test_closure_scorer() {
        let graph = ThreatGraph::new();
        let by_length = |_: &ThreatGraph, p: &AttackPath| p.len() as f64;
        let path = AttackPath { node_ids: vec![EntityId::new("x")], labels: vec!["x".into()] };
        assert_eq!(by_length.score(&graph, &path), 1.0);
    }
}
