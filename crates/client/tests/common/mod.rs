#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tripmate_client::TripMateApi;

/// Request counter shared with test handlers.
#[derive(Clone, Default)]
pub struct Hits(pub Arc<AtomicUsize>);

impl Hits {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Serve `router` under `/api` on an ephemeral local port and return a
/// client pointed at it.
pub async fn spawn_backend(router: Router) -> TripMateApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().nest("/api", router);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TripMateApi::new(&format!("http://{addr}/api/"), Duration::from_secs(5)).unwrap()
}

/// A client pointed at a port nothing is listening on.
pub async fn unreachable_client() -> TripMateApi {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    TripMateApi::new(&format!("http://{addr}/api/"), Duration::from_secs(5)).unwrap()
}

pub fn trip_json(id: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": "Italy by car",
        "description": "",
        "start_date": "2025-06-01",
        "end_date": "2025-06-10",
        "status": "planning",
        "privacy": "private",
        "total_distance": null,
        "total_duration": null
    })
}
