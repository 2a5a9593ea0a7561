//! OTM and Threagile mapping across a full export/import cycle

use threatflow::graph::keys;
use threatflow::interchange::{to_yaml, LAYOUT_EXTENSION};
use threatflow::{
    apply_otm, build_otm, build_threagile, parse_otm, Entity, EntityKind, Flow, OtmDocument, OtmOptions,
    ThreagileOptions, ThreatGraph,
};

fn segmented_network() -> ThreatGraph {
    ThreatGraph::from_parts(
        vec![
            Entity::new("dmz", EntityKind::TrustBoundary)
                .with_label("DMZ")
                .with_attribute(keys::BOUNDARY_TYPE, "network")
                .at(0.0, 0.0)
                .with_size(400.0, 300.0),
            Entity::new("client", EntityKind::Actor).with_label("Browser").at(-300.0, 40.0),
            Entity::new("web", EntityKind::Process)
                .with_label("Web Frontend")
                .with_technology("nginx")
                .with_attribute(keys::PUBLIC_NETWORK, "yes")
                .at(50.0, 50.0),
            Entity::new("db", EntityKind::Store)
                .with_label("Orders DB")
                .with_attribute(keys::CONTAINS_PII, true)
                .at(600.0, 50.0),
        ],
        vec![
            Flow::new("f1", "client", "web").with_protocol("HTTPS"),
            Flow::new("f2", "web", "db")
                .with_protocol("postgres")
                .with_authentication("basic"),
        ],
    )
}

#[test]
fn test_otm_json_round_trip() {
    let graph = segmented_network();
    let doc = build_otm(&graph, &OtmOptions::named("Shop")).unwrap();
    let json = doc.to_json_pretty().unwrap();

    let parsed = OtmDocument::from_json_str(&json).unwrap();
    assert_eq!(parsed, doc);
    assert_eq!(apply_otm(&parsed).snapshot(), graph.snapshot());
}

#[test]
fn test_otm_component_trust_zone_from_containment() {
    let doc = build_otm(&segmented_network(), &OtmOptions::named("Shop")).unwrap();

    let zone_of = |id: &str| {
        doc.components
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.trust_zone.clone())
    };
    assert_eq!(zone_of("web").as_deref(), Some("dmz"));
    assert_eq!(zone_of("client"), None);
    assert_eq!(doc.trust_zones.len(), 1);
    assert_eq!(doc.dataflows.len(), 2);
    assert!(doc.extensions.as_ref().unwrap().contains_key(LAYOUT_EXTENSION));
}

#[test]
fn test_threagile_export_survives_otm_cycle() {
    let graph = segmented_network();
    let options = ThreagileOptions::new("Shop", "2024-01-31");
    let direct = build_threagile(&graph, &options);

    let doc = parse_otm(serde_json::to_value(build_otm(&graph, &OtmOptions::default()).unwrap()).unwrap()).unwrap();
    let cycled = build_threagile(&apply_otm(&doc), &options);
    assert_eq!(direct, cycled);
}

#[test]
fn test_threagile_document_shape() {
    let doc = build_threagile(&segmented_network(), &ThreagileOptions::new("Shop", "2024-01-31"));

    let web = &doc.technical_assets["web"];
    assert_eq!(web.technology, "nginx");
    assert!(web.internet);
    let links = web.communication_links.as_ref().unwrap();
    let link = &links["link-web-db"];
    assert_eq!(link.protocol, "postgres");
    assert_eq!(link.authentication, "credentials");

    let client_links = doc.technical_assets["client"].communication_links.as_ref().unwrap();
    assert_eq!(client_links["link-client-web"].protocol, "https");
    assert_eq!(doc.technical_assets["db"].communication_links, None);

    let dmz = &doc.trust_boundaries["dmz"];
    assert_eq!(dmz.boundary_type, "network-cloud-security-group");
    assert_eq!(dmz.technical_assets_inside, vec!["web".to_string()]);

    let yaml: serde_yaml::Value = serde_yaml::from_str(&to_yaml(&doc).unwrap()).unwrap();
    assert_eq!(yaml["title"], serde_yaml::Value::from("Shop"));
    assert_eq!(yaml["technical_assets"]["db"]["communication_links"], serde_yaml::Value::Null);
    assert_eq!(yaml["technical_assets"]["db"]["type"], serde_yaml::Value::from("datastore"));
}
