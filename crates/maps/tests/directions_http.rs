//! Google Directions client against an in-process stand-in.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use tripmate_core::destination::Destination;
use tripmate_maps::google::GoogleDirections;
use tripmate_maps::provider::{DirectionsService, DirectionsStatus, MapOptions};
use tripmate_maps::route::build_route_request;
use tripmate_maps::scene::{LoadBehavior, MemoryScriptHost};
use tripmate_maps::{MapSession, RenderOutcome, ScriptLoader};

async fn directions(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    if params.get("key").map(String::as_str) != Some("good") {
        return Json(json!({"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}));
    }
    Json(json!({
        "status": "OK",
        "routes": [{
            "summary": params.get("waypoints").cloned().unwrap_or_default(),
            "overview_polyline": {"points": "enc"},
            "legs": [
                {"start_address": "Paris", "end_address": "Milan",
                 "distance": {"value": 850000}, "duration": {"value": 30000}},
                {"start_address": "Milan", "end_address": "Rome",
                 "distance": {"value": 575000}, "duration": {"value": 20000}}
            ]
        }]
    }))
}

async fn spawn_directions() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/directions/json", get(directions));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/directions/json")
}

fn dest(id: i64, name: &str, order_index: i32, lat: f64, lng: f64) -> Destination {
    Destination {
        id,
        name: name.to_string(),
        address: String::new(),
        latitude: lat,
        longitude: lng,
        place_id: String::new(),
        notes: String::new(),
        visit_date: None,
        visit_time: None,
        duration_minutes: None,
        order_index,
        media_count: None,
        created_at: None,
    }
}

fn italy() -> Vec<Destination> {
    vec![
        dest(1, "Paris", 0, 48.8566, 2.3522),
        dest(2, "Rome", 2, 41.9028, 12.4964),
        dest(3, "Milan", 1, 45.4642, 9.19),
    ]
}

#[tokio::test]
async fn directions_request_round_trip() {
    let endpoint = spawn_directions().await;
    let client = GoogleDirections::with_endpoint(reqwest::Client::new(), "good", endpoint);

    let request = build_route_request(&italy()).unwrap();
    let result = client.route(&request).await.unwrap();

    assert!(result.status.is_ok());
    let route = result.route.unwrap();
    // The stand-in echoes the waypoints parameter as the summary.
    assert_eq!(route.summary, "45.4642,9.19");
    assert_eq!(route.total_distance_meters(), 1_425_000);
}

#[tokio::test]
async fn rejected_key_renders_markers() {
    let endpoint = spawn_directions().await;
    let directions = Arc::new(GoogleDirections::with_endpoint(
        reqwest::Client::new(),
        "bad",
        endpoint,
    ));
    let result = directions
        .route(&build_route_request(&italy()).unwrap())
        .await
        .unwrap();
    assert_eq!(result.status, DirectionsStatus::RequestDenied);

    let host = Arc::new(MemoryScriptHost::new(LoadBehavior::Load, directions));
    let loader = ScriptLoader::new(
        host.clone(),
        Some("bad".into()),
        tripmate_maps::loader::DEFAULT_LOAD_TIMEOUT,
    );
    let session = MapSession::new(loader, "map", MapOptions::default());
    session.start().await.unwrap();

    let outcome = session.render(&italy()).await.unwrap();
    assert!(matches!(outcome, RenderOutcome::Markers { count: 3, .. }));

    let scene = host.recording().last_canvas().unwrap().snapshot();
    let titles: Vec<_> = scene.markers.iter().map(|m| m.spec.title.as_str()).collect();
    assert_eq!(titles, ["Paris", "Milan", "Rome"]);
    session.teardown();
}
