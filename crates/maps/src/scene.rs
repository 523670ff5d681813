//! In-memory mapping provider.
//!
//! [`RecordingProvider`] creates canvases that record every marker,
//! viewport change, and drawn route into a serializable [`Scene`]. The CLI
//! prints that scene in place of a visual map; tests assert on it.
//! [`MemoryScriptHost`] plays the document that the provider script is
//! loaded into, and [`ScriptedDirections`] answers route requests from a
//! queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::Serialize;
use tripmate_core::types::LatLng;

use crate::error::MapError;
use crate::provider::{
    Bounds, DirectionsRenderer, DirectionsResult, DirectionsService, DirectionsStatus,
    MapCanvas, MapOptions, MapProvider, MarkerSpec, OverlayId, RoutePath, RouteRequest,
    ScriptHost,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Everything currently drawn on one map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub container: String,
    pub center: LatLng,
    pub zoom: u8,
    /// Set by the last fit-bounds call, cleared by explicit centering.
    pub bounds: Option<Bounds>,
    pub markers: Vec<SceneMarker>,
    pub route: Option<RoutePath>,
    /// HTML of the info popup opened by the last marker click.
    pub open_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneMarker {
    pub id: OverlayId,
    #[serde(flatten)]
    pub spec: MarkerSpec,
}

// ---------- canvas ----------

/// A [`MapCanvas`] that records what is drawn on it.
pub struct RecordingCanvas {
    scene: Mutex<Scene>,
    next_id: AtomicU64,
}

impl RecordingCanvas {
    pub fn new(container: &str, options: &MapOptions) -> Self {
        Self {
            scene: Mutex::new(Scene {
                container: container.to_string(),
                center: options.center,
                zoom: options.zoom,
                bounds: None,
                markers: Vec::new(),
                route: None,
                open_info: None,
            }),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> Scene {
        lock(&self.scene).clone()
    }

    /// Simulate a click on a marker. Opens its info popup, if it has one,
    /// and returns the popup HTML.
    pub fn click_marker(&self, id: OverlayId) -> Option<String> {
        let mut scene = lock(&self.scene);
        let html = scene
            .markers
            .iter()
            .find(|m| m.id == id)
            .and_then(|m| m.spec.info.as_ref())
            .map(|info| info.to_html())?;
        scene.open_info = Some(html.clone());
        Some(html)
    }

    fn set_route(&self, route: Option<RoutePath>) {
        lock(&self.scene).route = route;
    }
}

impl MapCanvas for RecordingCanvas {
    fn add_marker(&self, marker: MarkerSpec) -> OverlayId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.scene).markers.push(SceneMarker { id, spec: marker });
        id
    }

    fn remove_overlay(&self, id: OverlayId) {
        let mut scene = lock(&self.scene);
        scene.markers.retain(|m| m.id != id);
        if scene.markers.is_empty() {
            scene.open_info = None;
        }
    }

    fn set_center(&self, at: LatLng) {
        let mut scene = lock(&self.scene);
        scene.center = at;
        scene.bounds = None;
    }

    fn set_zoom(&self, zoom: u8) {
        lock(&self.scene).zoom = zoom;
    }

    fn fit_bounds(&self, bounds: Bounds) {
        let mut scene = lock(&self.scene);
        scene.center = LatLng::new(
            (bounds.south_west.lat + bounds.north_east.lat) / 2.0,
            (bounds.south_west.lng + bounds.north_east.lng) / 2.0,
        );
        scene.bounds = Some(bounds);
    }
}

/// Draws routes into a [`RecordingCanvas`]'s scene.
pub struct RecordingRenderer {
    canvas: Arc<RecordingCanvas>,
}

impl DirectionsRenderer for RecordingRenderer {
    fn set_directions(&self, route: &RoutePath) {
        self.canvas.set_route(Some(route.clone()));
    }

    fn clear(&self) {
        self.canvas.set_route(None);
    }
}

// ---------- provider ----------

/// A [`MapProvider`] whose maps are [`RecordingCanvas`]es.
pub struct RecordingProvider {
    directions: Arc<dyn DirectionsService>,
    canvases: Mutex<Vec<Arc<RecordingCanvas>>>,
}

impl RecordingProvider {
    pub fn new(directions: Arc<dyn DirectionsService>) -> Self {
        Self {
            directions,
            canvases: Mutex::new(Vec::new()),
        }
    }

    /// Every map created so far, oldest first.
    pub fn canvases(&self) -> Vec<Arc<RecordingCanvas>> {
        lock(&self.canvases).clone()
    }

    /// The most recently created map.
    pub fn last_canvas(&self) -> Option<Arc<RecordingCanvas>> {
        lock(&self.canvases).last().cloned()
    }

    fn find(&self, map: &Arc<dyn MapCanvas>) -> Option<Arc<RecordingCanvas>> {
        let target = Arc::as_ptr(map) as *const ();
        lock(&self.canvases)
            .iter()
            .find(|c| Arc::as_ptr(c) as *const () == target)
            .cloned()
    }
}

impl MapProvider for RecordingProvider {
    fn create_map(
        &self,
        container: &str,
        options: &MapOptions,
    ) -> Result<Arc<dyn MapCanvas>, MapError> {
        if container.trim().is_empty() {
            return Err(MapError::Provider("map container is missing".to_string()));
        }
        let canvas = Arc::new(RecordingCanvas::new(container, options));
        lock(&self.canvases).push(canvas.clone());
        Ok(canvas)
    }

    fn directions_service(&self) -> Arc<dyn DirectionsService> {
        self.directions.clone()
    }

    fn directions_renderer(&self, map: &Arc<dyn MapCanvas>) -> Arc<dyn DirectionsRenderer> {
        // Maps handed out by this provider are always recording canvases.
        let canvas = self
            .find(map)
            .unwrap_or_else(|| Arc::new(RecordingCanvas::new("detached", &MapOptions::default())));
        Arc::new(RecordingRenderer { canvas })
    }
}

// ---------- directions ----------

/// Answers route requests from a queue of canned results.
///
/// When the queue is empty every request gets `ZERO_RESULTS`.
#[derive(Default)]
pub struct ScriptedDirections {
    responses: Mutex<VecDeque<Result<DirectionsResult, MapError>>>,
    requests: Mutex<Vec<RouteRequest>>,
}

impl ScriptedDirections {
    pub fn push(&self, response: Result<DirectionsResult, MapError>) {
        lock(&self.responses).push_back(response);
    }

    /// Queue an OK result carrying `route`.
    pub fn push_route(&self, route: RoutePath) {
        self.push(Ok(DirectionsResult {
            status: DirectionsStatus::Ok,
            route: Some(route),
        }));
    }

    /// Queue a provider-reported failure.
    pub fn push_status(&self, status: DirectionsStatus) {
        self.push(Ok(DirectionsResult {
            status,
            route: None,
        }));
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RouteRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl DirectionsService for ScriptedDirections {
    async fn route(&self, request: &RouteRequest) -> Result<DirectionsResult, MapError> {
        lock(&self.requests).push(request.clone());
        let next = lock(&self.responses).pop_front();
        next.unwrap_or(Ok(DirectionsResult {
            status: DirectionsStatus::ZeroResults,
            route: None,
        }))
    }
}

// ---------- script host ----------

/// What happens when [`MemoryScriptHost`] is asked to load a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadBehavior {
    /// Fire the load event and install the provider global.
    Load,
    /// Fire the error event.
    Error,
    /// Fire neither event.
    Hang,
}

/// A document held in memory, hosting a [`RecordingProvider`].
pub struct MemoryScriptHost {
    behavior: Mutex<LoadBehavior>,
    provider: Arc<RecordingProvider>,
    global: AtomicBool,
    tag: AtomicBool,
    injections: AtomicUsize,
}

impl MemoryScriptHost {
    pub fn new(behavior: LoadBehavior, directions: Arc<dyn DirectionsService>) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            provider: Arc::new(RecordingProvider::new(directions)),
            global: AtomicBool::new(false),
            tag: AtomicBool::new(false),
            injections: AtomicUsize::new(0),
        }
    }

    pub fn set_behavior(&self, behavior: LoadBehavior) {
        *lock(&self.behavior) = behavior;
    }

    /// Make the provider global available, as a finished script would.
    pub fn install_global(&self) {
        self.global.store(true, Ordering::SeqCst);
    }

    /// Add a provider script tag without loading it.
    pub fn add_script_tag(&self) {
        self.tag.store(true, Ordering::SeqCst);
    }

    /// Number of script tags injected through [`ScriptHost::load_script`].
    pub fn injections(&self) -> usize {
        self.injections.load(Ordering::SeqCst)
    }

    pub fn recording(&self) -> Arc<RecordingProvider> {
        self.provider.clone()
    }
}

#[async_trait]
impl ScriptHost for MemoryScriptHost {
    fn provider(&self) -> Option<Arc<dyn MapProvider>> {
        if self.global.load(Ordering::SeqCst) {
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

    async fn load_script(&self, _src: &str) -> Result<(), String> {
        self.injections.fetch_add(1, Ordering::SeqCst);
        self.tag.store(true, Ordering::SeqCst);
        let behavior = *lock(&self.behavior);
        match behavior {
            LoadBehavior::Load => {
                self.install_global();
                Ok(())
            }
            LoadBehavior::Error => Err("script error event".to_string()),
            LoadBehavior::Hang => std::future::pending().await,
        }
    }
}
