mod common;

use common::{Reply, ScriptedBackend, feature, overlay_tiff};
use firelens::models::overlay::OverlayKind;
use firelens::models::scenario::ScenarioLayers;
use firelens::{Config, MapServer};
use serde_json::{Value, json};
use std::sync::Arc;

async fn serve(backend: ScriptedBackend) -> String {
    let server = MapServer::with_backend(Config::default(), Arc::new(backend))
        .await
        .unwrap();
    let app = server.router();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{}", addr)
}

async fn toggle(client: &reqwest::Client, base: &str, key: &str, checked: bool) -> Value {
    client
        .post(format!("{}/layers/{}", base, key))
        .json(&json!({ "checked": checked }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_toggle_attaches_and_serves_tiles() {
    let backend = ScriptedBackend::new();
    backend.push(OverlayKind::BurnSeverity, Reply::Tiff(overlay_tiff(300, 20)));
    let base = serve(backend).await;
    let client = reqwest::Client::new();

    let initial: Value = client
        .get(format!("{}/layers", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(initial["legend"]["visible"], false);
    assert!(initial["snapshot"]["overlay"].is_null());

    let body = toggle(&client, &base, "burnSeverity", true).await;
    assert_eq!(body["transition"]["outcome"], "attached");
    assert!(body["tip"].as_str().unwrap().starts_with("Burn Severity layer enabled."));
    assert_eq!(body["layers"]["legend"]["title"], "Burn Severity");
    assert_eq!(body["layers"]["legend"]["checked"], json!(["burnSeverity"]));

    let overlay = &body["layers"]["snapshot"]["overlay"];
    let tiles = overlay["tiles"].as_array().unwrap();
    assert_eq!(tiles.len(), 2);
    let url = format!(
        "{}/overlay/{}/{}/{}.png",
        base, overlay["layer"], tiles[1]["col"], tiles[1]["row"]
    );
    let tile = client.get(url).send().await.unwrap();
    assert_eq!(tile.status(), 200);
    assert_eq!(tile.headers()["content-type"], "image/png");
    let png = tile.bytes().await.unwrap();
    assert_eq!(&png[..4], b"\x89PNG");

    let missing = client
        .get(format!("{}/overlay/999/0/0.png", base))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_missing_raster_reports_fallback_markers() {
    let mut layers = ScenarioLayers::new();
    layers.insert(OverlayKind::ReburnRisk, vec![feature(39.7, -121.5, 0.5)]);
    let base = serve(ScriptedBackend::with_layers(layers)).await;
    let client = reqwest::Client::new();

    let body = toggle(&client, &base, "reburnRisk", true).await;

    assert_eq!(body["transition"]["outcome"], "fallback");
    assert_eq!(body["transition"]["reason"], "no raster available");
    let snapshot = &body["layers"]["snapshot"];
    assert_eq!(snapshot["active"], "reburnRisk");
    assert_eq!(snapshot["markers"].as_array().unwrap().len(), 1);
    assert_eq!(snapshot["markers"][0]["radius_m"], 15000.0);

    let cleared = toggle(&client, &base, "reburnRisk", false).await;
    assert_eq!(cleared["transition"]["outcome"], "cleared");
    assert_eq!(cleared["layers"]["snapshot"]["markers"], json!([]));
    assert_eq!(cleared["layers"]["legend"]["visible"], false);
}

#[tokio::test]
async fn test_unknown_layer_is_bad_request() {
    let base = serve(ScriptedBackend::new()).await;
    let response = reqwest::Client::new()
        .post(format!("{}/layers/perimeter", base))
        .json(&json!({ "checked": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_session_endpoints() {
    let base = serve(ScriptedBackend::new()).await;
    let client = reqwest::Client::new();

    let fires: Value = client
        .get(format!("{}/fires?state=CA", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fires["fromFallback"], true);
    assert!(fires["fires"].as_array().unwrap().iter().all(|f| f["state"] == "CA"));

    let scenario: Value = client
        .get(format!("{}/scenario", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(scenario["state"]["fireId"], "camp-fire-2018");
    assert_eq!(scenario["stage"]["label"], "Initial assessment (Day 7)");

    let updated: Value = client
        .put(format!("{}/scenario", base))
        .json(&json!({ "timeline": 4, "priorities": { "watershed": 90 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["layers"]["stage"]["label"], "Recovery outlook (Year 1)");

    let selected: Value = client
        .post(format!("{}/fires/dixie-fire-2021/select", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(selected["layers"]["snapshot"]["fireId"], "dixie-fire-2021");

    let answer: Value = client
        .get(format!("{}/ask", base))
        .query(&[("question", "What should crews do first?")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(answer["answer"], "Seed native grasses on the upper slopes.");
}
