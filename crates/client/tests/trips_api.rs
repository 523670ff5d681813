//! REST client tests against an in-process backend stand-in.

mod common;

use assert_matches::assert_matches;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::json;

use common::{spawn_backend, trip_json, unreachable_client, Hits};
use tripmate_client::error::{ErrorKind, AUTH_REQUIRED_MESSAGE, NETWORK_MESSAGE, NOT_FOUND_MESSAGE};
use tripmate_client::ApiError;
use tripmate_core::media::{MediaType, MediaUpload};
use tripmate_core::trip::{CreateTrip, END_BEFORE_START_MESSAGE};

async fn get_trip_handler(Path(id): Path<i64>, headers: HeaderMap) -> (StatusCode, Json<serde_json::Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Token secret");
    match (authorized, id) {
        (false, _) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Authentication credentials were not provided."})),
        ),
        (true, 1) => (StatusCode::OK, Json(trip_json(1))),
        (true, _) => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))),
    }
}

async fn create_trip_handler(State(hits): State<Hits>) -> (StatusCode, Json<serde_json::Value>) {
    hits.bump();
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"title": ["Ensure this field has no more than 200 characters."]})),
    )
}

fn trips_router(hits: Hits) -> Router {
    Router::new()
        .route("/trips/{id}/", get(get_trip_handler))
        .route("/trips/", post(create_trip_handler))
        .with_state(hits)
}

#[tokio::test]
async fn get_trip_sends_token_header() {
    let api = spawn_backend(trips_router(Hits::default())).await;
    api.set_token(Some("secret".into())).await;

    let trip = api.get_trip(1).await.unwrap();
    assert_eq!(trip.id, 1);
    assert_eq!(trip.title, "Italy by car");
    assert_eq!(trip.duration_days(), Some(10));
}

#[tokio::test]
async fn missing_trip_is_classified_not_found() {
    let api = spawn_backend(trips_router(Hits::default())).await;
    api.set_token(Some("secret".into())).await;

    let err = api.get_trip(99).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.user_message("Failed to fetch trip data"), NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn missing_token_is_classified_unauthorized() {
    let api = spawn_backend(trips_router(Hits::default())).await;

    let err = api.get_trip(1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(err.user_message("x"), AUTH_REQUIRED_MESSAGE);
}

#[tokio::test]
async fn rejected_create_surfaces_field_errors() {
    let hits = Hits::default();
    let api = spawn_backend(trips_router(hits.clone())).await;

    let form = CreateTrip {
        title: "x".repeat(300),
        ..Default::default()
    };
    let err = api.create_trip(&form).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(
        err.user_message("Failed to create trip"),
        "Ensure this field has no more than 200 characters."
    );
    assert_eq!(hits.count(), 1);
}

#[tokio::test]
async fn invalid_dates_never_reach_the_backend() {
    let hits = Hits::default();
    let api = spawn_backend(trips_router(hits.clone())).await;

    let form = CreateTrip {
        title: "Backwards".into(),
        start_date: NaiveDate::from_ymd_opt(2025, 6, 10),
        end_date: NaiveDate::from_ymd_opt(2025, 6, 1),
        ..Default::default()
    };
    let err = api.create_trip(&form).await.unwrap_err();
    assert_matches!(err, ApiError::Invalid(_));
    assert_eq!(err.user_message("x"), END_BEFORE_START_MESSAGE);
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    let api = unreachable_client().await;

    let err = api.get_trip(1).await.unwrap_err();
    assert_matches!(err, ApiError::Network(_));
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.user_message("x"), NETWORK_MESSAGE);
}

async fn upload_handler(mut multipart: Multipart) -> Json<serde_json::Value> {
    let mut title = String::new();
    let mut file_name = String::new();
    let mut size = 0usize;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().unwrap_or_default().to_string();
                size = field.bytes().await.unwrap().len();
            }
            Some("title") => title = field.text().await.unwrap(),
            _ => {}
        }
    }
    Json(json!({
        "id": 5,
        "media_type": MediaType::from_file_name(&file_name).as_str(),
        "file_url": format!("/media/{file_name}"),
        "title": title,
        "file_size": size,
    }))
}

#[tokio::test]
async fn upload_media_sends_multipart_form() {
    let router = Router::new().route("/trips/{id}/upload_media/", post(upload_handler));
    let api = spawn_backend(router).await;

    let item = api
        .upload_media(
            1,
            MediaUpload {
                file_name: "colosseum.jpg".into(),
                bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
                title: Some("Colosseum".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(item.media_type, MediaType::Image);
    assert_eq!(item.title, "Colosseum");
    assert_eq!(item.file_size, Some(4));
}

#[tokio::test]
async fn empty_upload_is_rejected_locally() {
    let api = unreachable_client().await;
    let err = api.upload_media(1, MediaUpload::default()).await.unwrap_err();
    assert_matches!(err, ApiError::Invalid(_));
}

#[tokio::test]
async fn short_place_query_skips_the_request() {
    let api = unreachable_client().await;
    let results = api.search_places("ab").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn optimize_failure_payload_exposes_backend_error() {
    let router = Router::new().route(
        "/trips/{id}/optimize_route/",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"success": false, "error": "Could not find route between destinations"})),
            )
        }),
    );
    let api = spawn_backend(router).await;

    let err = api.optimize_route(1).await.unwrap_err();
    assert_eq!(
        err.user_message("Failed to optimize route"),
        "Could not find route between destinations"
    );
}
