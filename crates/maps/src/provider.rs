//! The mapping provider, expressed as traits.
//!
//! [`ScriptHost`] is the document: it knows whether the provider's script
//! tag exists and whether the provider global has appeared. Once it has,
//! [`MapProvider`] creates the per-view surfaces: a [`MapCanvas`] for
//! markers and viewport, a [`DirectionsService`] for route requests, and a
//! [`DirectionsRenderer`] that draws a returned route on the canvas.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tripmate_core::types::LatLng;

use crate::error::MapError;

/// Zoom applied when the map shows a single point.
pub const SINGLE_POINT_ZOOM: u8 = 15;

/// Handle to an overlay created on a [`MapCanvas`].
pub type OverlayId = u64;

// ---------- script bootstrap ----------

/// The document that hosts the provider script.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    /// The provider global, if it is already available.
    fn provider(&self) -> Option<Arc<dyn MapProvider>>;

    /// Whether a script tag whose `src` starts with `src_prefix` exists.
    fn has_script_tag(&self, src_prefix: &str) -> bool;

    /// Remove script tags whose `src` starts with `src_prefix`.
    fn remove_script_tag(&self, src_prefix: &str);

    /// Inject a script tag for `src` and resolve on its load or error
    /// event. The error carries whatever the host could report about it.
    async fn load_script(&self, src: &str) -> Result<(), String>;
}

/// The loaded provider global.
pub trait MapProvider: Send + Sync {
    /// Create a map bound to the element identified by `container`.
    fn create_map(
        &self,
        container: &str,
        options: &MapOptions,
    ) -> Result<Arc<dyn MapCanvas>, MapError>;

    fn directions_service(&self) -> Arc<dyn DirectionsService>;

    /// A renderer that draws routes onto `map`.
    fn directions_renderer(&self, map: &Arc<dyn MapCanvas>) -> Arc<dyn DirectionsRenderer>;
}

impl std::fmt::Debug for dyn MapProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MapProvider")
    }
}

/// Initial viewport of a new map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapOptions {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            center: LatLng::new(37.7749, -122.4194),
            zoom: 10,
        }
    }
}

// ---------- canvas ----------

/// Markers and viewport of one map.
pub trait MapCanvas: Send + Sync {
    /// Add a marker. When `marker.info` is set, clicking the marker opens
    /// an info popup with that content.
    fn add_marker(&self, marker: MarkerSpec) -> OverlayId;

    /// Remove an overlay created by [`MapCanvas::add_marker`]. Unknown ids
    /// are ignored.
    fn remove_overlay(&self, id: OverlayId);

    fn set_center(&self, at: LatLng);

    fn set_zoom(&self, zoom: u8);

    fn fit_bounds(&self, bounds: Bounds);
}

/// A marker to place on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub title: String,
    /// Short text drawn on the marker itself, e.g. its stop number.
    pub label: Option<String>,
    pub info: Option<InfoContent>,
}

/// Content of a marker's info popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoContent {
    pub name: String,
    pub address: String,
    /// Omitted from the popup when empty.
    pub notes: String,
}

impl InfoContent {
    /// Render the popup body as escaped HTML.
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<div class=\"info-window\"><h3>{}</h3><p>{}</p>",
            escape_html(&self.name),
            escape_html(&self.address)
        );
        if !self.notes.trim().is_empty() {
            html.push_str(&format!("<p><em>{}</em></p>", escape_html(&self.notes)));
        }
        html.push_str("</div>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A latitude/longitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// The smallest box containing every point, or `None` for no points.
    pub fn containing(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for p in points {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn contains(&self, p: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&p.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&p.lng)
    }
}

// ---------- directions ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    /// Value of the web service's `mode` parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Bicycling => "bicycling",
            Self::Transit => "transit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

/// An intermediate point of a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Waypoint {
    pub location: LatLng,
    /// Whether the route stops here, as opposed to passing through.
    pub stopover: bool,
}

/// A directions request through an ordered list of points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    pub origin: LatLng,
    pub destination: LatLng,
    pub waypoints: Vec<Waypoint>,
    pub travel_mode: TravelMode,
    pub unit_system: UnitSystem,
    pub avoid_tolls: bool,
}

/// Status reported by the directions provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DirectionsStatus {
    Ok,
    NotFound,
    ZeroResults,
    MaxWaypointsExceeded,
    MaxRouteLengthExceeded,
    InvalidRequest,
    OverQueryLimit,
    RequestDenied,
    UnknownError,
    /// A status string this client does not know.
    Other(String),
}

impl DirectionsStatus {
    pub fn parse(status: &str) -> Self {
        match status {
            "OK" => Self::Ok,
            "NOT_FOUND" => Self::NotFound,
            "ZERO_RESULTS" => Self::ZeroResults,
            "MAX_WAYPOINTS_EXCEEDED" => Self::MaxWaypointsExceeded,
            "MAX_ROUTE_LENGTH_EXCEEDED" => Self::MaxRouteLengthExceeded,
            "INVALID_REQUEST" => Self::InvalidRequest,
            "OVER_QUERY_LIMIT" => Self::OverQueryLimit,
            "REQUEST_DENIED" => Self::RequestDenied,
            "UNKNOWN_ERROR" => Self::UnknownError,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for DirectionsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ok => "OK",
            Self::NotFound => "NOT_FOUND",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::MaxWaypointsExceeded => "MAX_WAYPOINTS_EXCEEDED",
            Self::MaxRouteLengthExceeded => "MAX_ROUTE_LENGTH_EXCEEDED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::OverQueryLimit => "OVER_QUERY_LIMIT",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::Other(s) => s,
        };
        f.write_str(s)
    }
}

/// One leg of a route, between consecutive stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLeg {
    pub start_address: String,
    pub end_address: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

/// A route returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePath {
    pub summary: String,
    pub legs: Vec<RouteLeg>,
    /// Encoded overview polyline.
    pub polyline: String,
}

impl RoutePath {
    pub fn total_distance_meters(&self) -> u64 {
        self.legs.iter().map(|l| l.distance_meters).sum()
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.legs.iter().map(|l| l.duration_seconds).sum()
    }
}

/// The provider's answer to a [`RouteRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionsResult {
    pub status: DirectionsStatus,
    /// Present when `status` is OK.
    pub route: Option<RoutePath>,
}

/// Issues route requests.
#[async_trait]
pub trait DirectionsService: Send + Sync {
    /// Request a route. A provider-reported failure is an `Ok` result with
    /// a non-OK status; `Err` means the request could not be made at all.
    async fn route(&self, request: &RouteRequest) -> Result<DirectionsResult, MapError>;
}

/// Draws a returned route on its map.
pub trait DirectionsRenderer: Send + Sync {
    fn set_directions(&self, route: &RoutePath);

    /// Remove the drawn route, if any.
    fn clear(&self);
}
