//! Executor HTTP routes exercised through the router without a socket

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use threatflow::http::router;
use threatflow::{build_otm, Dispatcher, Entity, EntityKind, Flow, OtmOptions, ThreatGraph};
use tower::ServiceExt;

fn device_otm() -> Value {
    let graph = ThreatGraph::from_parts(
        vec![
            Entity::new("uart", EntityKind::Actor).with_label("UART").with_technology("UART"),
            Entity::new("linux", EntityKind::Process).with_label("Linux"),
            Entity::new("spi", EntityKind::Store).with_label("SPI Device").with_technology("SPI"),
        ],
        vec![Flow::new("f1", "uart", "linux"), Flow::new("f2", "linux", "spi")],
    );
    serde_json::to_value(build_otm(&graph, &OtmOptions::named("Device")).unwrap()).unwrap()
}

async fn send(method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let app = router(Arc::new(Dispatcher::default()));
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_status_route() {
    let (status, body) = send("GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rules"], 5);
    assert_eq!(body["components"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_attack_paths_route() {
    let (status, body) = send(
        "POST",
        "/components/attack-paths/execute",
        Some(json!({ "otm": device_otm(), "op": { "k": 5 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paths"][0]["labels"], json!(["UART", "Linux", "SPI Device"]));
}

#[tokio::test]
async fn test_attack_methods_route() {
    let (status, body) = send(
        "POST",
        "/components/attack-methods/execute",
        Some(json!({ "otm": device_otm(), "op": {} })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["methods"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["id"].as_str())
        .collect();
    assert!(ids.contains(&"uart-linux-spi-dump"));
}

#[tokio::test]
async fn test_tara_route_without_document() {
    let (status, body) = send(
        "POST",
        "/components/tara-derive/execute",
        Some(json!({ "op": { "rows": [{ "impactRating": "Major", "attackVectorBasedApproach": "Medium" }] } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"][0]["riskValue"], 3);
    assert_eq!(body["rows"][0]["cal"], "CAL3");
}

#[tokio::test]
async fn test_error_statuses() {
    let (status, body) = send("POST", "/components/nope/execute", Some(json!({ "op": {} }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));

    let (status, _) = send("POST", "/components/attack-paths/execute", Some(json!({ "op": {} }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        "POST",
        "/components/dataflow-editor/execute",
        Some(json!({ "otm": device_otm(), "op": { "action": "rename" } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
