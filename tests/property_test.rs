//! Property-based tests for path enumeration, OTM mapping and TARA derivation

use proptest::prelude::*;
use std::collections::HashSet;
use threatflow::tara::TaraRow;
use threatflow::{
    apply_otm, apply_tara_derivations, build_otm, enumerate_paths, AnalyzeOptions, Entity, EntityKind, Flow,
    OtmDocument, OtmOptions, ThreatGraph,
};

fn kind_strategy() -> impl Strategy<Value = EntityKind> {
    prop_oneof![
        Just(EntityKind::Actor),
        Just(EntityKind::Process),
        Just(EntityKind::Process),
        Just(EntityKind::Store),
    ]
}

/// Random component graphs with up to 8 entities and arbitrary flows
fn graph_strategy() -> impl Strategy<Value = ThreatGraph> {
    prop::collection::vec((kind_strategy(), "[A-Za-z]{1,8}", -20i32..20, -20i32..20), 1..8).prop_flat_map(
        |entities| {
            let n = entities.len();
            (
                Just(entities),
                prop::collection::vec((0..n, 0..n, prop::option::of("(HTTP|HTTPS|mqtt|)")), 0..20),
            )
        },
    )
    .prop_map(|(entities, edges)| {
        let entities = entities
            .into_iter()
            .enumerate()
            .map(|(i, (kind, label, x, y))| {
                Entity::new(format!("n{}", i), kind)
                    .with_label(label)
                    .at(x as f64 * 50.0, y as f64 * 50.0)
            })
            .collect();
        let flows = edges
            .into_iter()
            .enumerate()
            .map(|(i, (s, t, protocol))| {
                let flow = Flow::new(format!("f{}", i), format!("n{}", s), format!("n{}", t));
                match protocol {
                    Some(p) => flow.with_protocol(p),
                    None => flow,
                }
            })
            .collect();
        ThreatGraph::from_parts(entities, flows)
    })
}

fn rating_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("Negligible".to_string()),
        Just("moderate".to_string()),
        Just(" Major ".to_string()),
        Just("Severe".to_string()),
        Just("2".to_string()),
        Just("2.5".to_string()),
        Just("7".to_string()),
        Just("".to_string()),
        "[a-z]{0,6}",
    ])
}

fn feasibility_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![
        Just("Very Low".to_string()),
        Just("vlow".to_string()),
        Just("LOW".to_string()),
        Just("med".to_string()),
        Just("High".to_string()),
        "[a-z]{0,6}",
    ])
}

/// Property: every enumerated path is a simple chain of flows from a
/// source to a target, within the requested bounds.
#[test]
fn prop_paths_are_bounded_simple_chains() {
    proptest!(|(graph in graph_strategy(), k in 1usize..6, max_depth in prop_oneof![1usize..6, Just(1usize << 40), Just(usize::MAX)])| {
        let options = AnalyzeOptions::default().with_k(k).with_max_depth(max_depth);
        let paths = enumerate_paths(&graph, &options);

        prop_assert!(paths.len() <= k);
        for path in &paths {
            prop_assert!(!path.is_empty());
            prop_assert!(path.len() <= max_depth.saturating_add(1));
            prop_assert_eq!(path.node_ids.len(), path.labels.len());

            let unique: HashSet<&str> = path.node_ids.iter().map(|id| id.as_str()).collect();
            prop_assert_eq!(unique.len(), path.node_ids.len(), "path revisits an entity");

            for hop in path.node_ids.windows(2) {
                prop_assert!(graph.flow_between(hop[0].as_str(), hop[1].as_str()).is_some());
            }
        }
    });
}

/// Property: a depth bound past the entity count changes nothing.
#[test]
fn prop_oversized_depth_matches_entity_count() {
    proptest!(|(graph in graph_strategy())| {
        let bounded = AnalyzeOptions::default().with_max_depth(graph.entity_count());
        let unbounded = AnalyzeOptions::default().with_max_depth(usize::MAX);
        prop_assert_eq!(enumerate_paths(&graph, &unbounded), enumerate_paths(&graph, &bounded));
    });
}

/// Property: enumeration is deterministic for a fixed graph.
#[test]
fn prop_paths_are_deterministic() {
    proptest!(|(graph in graph_strategy())| {
        let options = AnalyzeOptions::default();
        prop_assert_eq!(enumerate_paths(&graph, &options), enumerate_paths(&graph, &options));
    });
}

/// Property: export then import through OTM JSON restores the graph.
#[test]
fn prop_otm_round_trip() {
    proptest!(|(graph in graph_strategy())| {
        let json = build_otm(&graph, &OtmOptions::default()).unwrap().to_json_pretty().unwrap();
        let doc = OtmDocument::from_json_str(&json).unwrap();
        prop_assert_eq!(apply_otm(&doc).snapshot(), graph.snapshot());
    });
}

/// Property: deriving TARA fields twice changes nothing.
#[test]
fn prop_tara_derivation_is_idempotent() {
    proptest!(|(impact in rating_strategy(), vector in feasibility_strategy(), feasibility in feasibility_strategy())| {
        let row = TaraRow {
            impact_rating: impact,
            attack_vector_based_approach: vector,
            attack_feasibility_rating: feasibility,
            ..Default::default()
        };
        let once = apply_tara_derivations(&[row]);
        let twice = apply_tara_derivations(&once);
        prop_assert_eq!(once, twice);
    });
}
