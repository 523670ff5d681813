//! Google Maps over HTTP.
//!
//! [`GoogleDirections`] implements [`DirectionsService`] against the
//! Directions web service. [`HttpScriptHost`] is a headless
//! [`ScriptHost`]: "loading" the script fetches the script URL, which
//! verifies the key is accepted and the service is reachable, and then
//! exposes a [`RecordingProvider`] whose routes come from
//! [`GoogleDirections`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tripmate_core::types::LatLng;

use crate::error::MapError;
use crate::loader::SCRIPT_URL_PREFIX;
use crate::provider::{
    DirectionsResult, DirectionsService, DirectionsStatus, MapProvider, RouteLeg, RoutePath,
    RouteRequest, ScriptHost, UnitSystem, Waypoint,
};
use crate::scene::RecordingProvider;

/// Directions web service endpoint.
pub const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Client for the Google Directions web service.
pub struct GoogleDirections {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GoogleDirections {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(client, api_key, DIRECTIONS_URL)
    }

    /// Use a different endpoint, e.g. a local stand-in.
    pub fn with_endpoint(
        client: reqwest::Client,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Query parameters for `request`.
    pub fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origin", format_point(request.origin)),
            ("destination", format_point(request.destination)),
            ("mode", request.travel_mode.as_param().to_string()),
            (
                "units",
                match request.unit_system {
                    UnitSystem::Metric => "metric",
                    UnitSystem::Imperial => "imperial",
                }
                .to_string(),
            ),
        ];
        if !request.waypoints.is_empty() {
            query.push(("waypoints", format_waypoints(&request.waypoints)));
        }
        if request.avoid_tolls {
            query.push(("avoid", "tolls".to_string()));
        }
        query.push(("key", self.api_key.clone()));
        query
    }
}

#[async_trait]
impl DirectionsService for GoogleDirections {
    async fn route(&self, request: &RouteRequest) -> Result<DirectionsResult, MapError> {
        tracing::debug!(
            waypoints = request.waypoints.len(),
            "Google Directions request"
        );
        let response = self
            .client
            .get(self.endpoint.as_str())
            .query(&self.query(request))
            .send()
            .await
            .map_err(|e| MapError::Directions(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapError::Directions(format!(
                "Directions service returned HTTP {}",
                status.as_u16()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| MapError::Directions(e.to_string()))?;
        parse_directions(&body)
    }
}

fn format_point(p: LatLng) -> String {
    format!("{},{}", p.lat, p.lng)
}

fn format_waypoints(waypoints: &[Waypoint]) -> String {
    waypoints
        .iter()
        .map(|w| {
            if w.stopover {
                format_point(w.location)
            } else {
                format!("via:{}", format_point(w.location))
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

// ---------- response parsing ----------

#[derive(Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Deserialize)]
struct ApiRoute {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    legs: Vec<ApiLeg>,
    #[serde(default)]
    overview_polyline: Option<ApiPolyline>,
}

#[derive(Deserialize)]
struct ApiLeg {
    #[serde(default)]
    start_address: String,
    #[serde(default)]
    end_address: String,
    #[serde(default)]
    distance: Option<ApiValue>,
    #[serde(default)]
    duration: Option<ApiValue>,
}

#[derive(Deserialize)]
struct ApiValue {
    value: u64,
}

#[derive(Deserialize)]
struct ApiPolyline {
    points: String,
}

/// Turn a Directions JSON body into a [`DirectionsResult`].
///
/// A non-OK `status` is returned as a result, not an error.
pub fn parse_directions(body: &str) -> Result<DirectionsResult, MapError> {
    let response: DirectionsResponse = serde_json::from_str(body)
        .map_err(|e| MapError::Directions(format!("Invalid directions response: {e}")))?;
    let status = DirectionsStatus::parse(&response.status);

    if !status.is_ok() {
        tracing::warn!(
            status = %status,
            message = response.error_message.as_deref().unwrap_or(""),
            "Directions request not OK",
        );
        return Ok(DirectionsResult {
            status,
            route: None,
        });
    }

    let route = response.routes.into_iter().next().map(|r| RoutePath {
        summary: r.summary,
        legs: r
            .legs
            .into_iter()
            .map(|l| RouteLeg {
                start_address: l.start_address,
                end_address: l.end_address,
                distance_meters: l.distance.map_or(0, |d| d.value),
                duration_seconds: l.duration.map_or(0, |d| d.value),
            })
            .collect(),
        polyline: r.overview_polyline.map(|p| p.points).unwrap_or_default(),
    });
    Ok(DirectionsResult { status, route })
}

// ---------- script host ----------

/// A [`ScriptHost`] without a document.
///
/// Its "script tag" exists while a fetch is in flight or after one
/// succeeded. A fetch that fails or is abandoned leaves no tag behind.
pub struct HttpScriptHost {
    client: reqwest::Client,
    provider: Arc<RecordingProvider>,
    script_base: String,
    tag: AtomicBool,
    loaded: AtomicBool,
}

impl HttpScriptHost {
    pub fn new(client: reqwest::Client, directions: Arc<dyn DirectionsService>) -> Self {
        Self::with_script_base(client, directions, SCRIPT_URL_PREFIX)
    }

    /// Fetch the script from `script_base` instead of Google, e.g. a local
    /// stand-in. The query string is kept.
    pub fn with_script_base(
        client: reqwest::Client,
        directions: Arc<dyn DirectionsService>,
        script_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            provider: Arc::new(RecordingProvider::new(directions)),
            script_base: script_base.into(),
            tag: AtomicBool::new(false),
            loaded: AtomicBool::new(false),
        }
    }

    pub fn recording(&self) -> Arc<RecordingProvider> {
        self.provider.clone()
    }
}

#[async_trait]
impl ScriptHost for HttpScriptHost {
    fn provider(&self) -> Option<Arc<dyn MapProvider>> {
        if self.loaded.load(Ordering::SeqCst) {
            Some(self.provider.clone())
        } else {
            None
        }
    }

    fn has_script_tag(&self, _src_prefix: &str) -> bool {
        self.tag.load(Ordering::SeqCst)
    }

    fn remove_script_tag(&self, _src_prefix: &str) {
        self.tag.store(false, Ordering::SeqCst);
    }

    async fn load_script(&self, src: &str) -> Result<(), String> {
        self.tag.store(true, Ordering::SeqCst);
        let pending = PendingTag(&self.tag);

        let url = match src.strip_prefix(SCRIPT_URL_PREFIX) {
            Some(query) => format!("{}{query}", self.script_base),
            None => src.to_string(),
        };
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("script request returned HTTP {}", status.as_u16()));
        }
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        if body.is_empty() {
            return Err("script response was empty".to_string());
        }
        self.loaded.store(true, Ordering::SeqCst);
        std::mem::forget(pending);
        Ok(())
    }
}

/// Clears the tag flag unless the fetch it guards completes, including
/// when the fetch future is dropped mid-flight.
struct PendingTag<'a>(&'a AtomicBool);

impl Drop for PendingTag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
