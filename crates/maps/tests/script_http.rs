//! Headless script loading against an in-process stand-in.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;

use tripmate_maps::google::HttpScriptHost;
use tripmate_maps::loader::SCRIPT_URL_PREFIX;
use tripmate_maps::provider::ScriptHost;
use tripmate_maps::scene::ScriptedDirections;
use tripmate_maps::{LoadState, MapError, ScriptLoader};

/// Serves the script; the first request stalls for `first_delay`.
async fn spawn_script(first_delay: Duration) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route(
            "/maps/api/js",
            get(|State((hits, delay)): State<(Arc<AtomicUsize>, Duration)>| async move {
                if hits.fetch_add(1, Ordering::SeqCst) == 0 {
                    tokio::time::sleep(delay).await;
                }
                "window.google = {};"
            }),
        )
        .with_state((hits.clone(), first_delay));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/maps/api/js"), hits)
}

fn host(base: String) -> Arc<HttpScriptHost> {
    Arc::new(HttpScriptHost::with_script_base(
        reqwest::Client::new(),
        Arc::new(ScriptedDirections::default()),
        base,
    ))
}

#[tokio::test]
async fn abandoned_fetch_leaves_no_tag() {
    let (base, _) = spawn_script(Duration::from_secs(5)).await;
    let host = host(base);

    let src = format!("{SCRIPT_URL_PREFIX}?key=k&libraries=places");
    let outcome = tokio::time::timeout(Duration::from_millis(200), host.load_script(&src)).await;
    assert!(outcome.is_err());

    assert!(!host.has_script_tag(SCRIPT_URL_PREFIX));
    assert!(host.provider().is_none());
}

#[tokio::test]
async fn retry_after_timeout_reinjects_and_recovers() {
    let (base, hits) = spawn_script(Duration::from_secs(3)).await;
    let host = host(base);
    let loader = ScriptLoader::new(host.clone(), Some("k".into()), Duration::from_millis(500));
    let cancel = CancellationToken::new();

    let first = loader.ensure_loaded(&cancel).await;
    assert_matches!(first, Err(MapError::Timeout { .. }));
    assert_matches!(loader.state(), LoadState::Failed { .. });

    let retry = loader.ensure_loaded(&cancel).await;
    assert!(retry.is_ok());
    assert!(loader.state().is_ready());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
