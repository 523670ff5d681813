//! Route rendering.
//!
//! [`RouteRenderer::render`] redraws the map for a destination list:
//! nothing for an empty list, a centered marker for a single stop, and a
//! driving route for two or more. When the route cannot be had, the stops
//! are drawn as numbered markers with info popups instead.
//!
//! Every pass starts by clearing the drawn route and removing every marker
//! the previous pass created, so passes never accumulate overlays. Each
//! pass also takes a generation number; a route response that comes back
//! after a newer pass has started is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::broadcast;
use tripmate_core::destination::{sorted_by_order, Destination};
use tripmate_core::types::DbId;

use crate::error::MapError;
use crate::events::MapSessionEvent;
use crate::provider::{
    Bounds, DirectionsRenderer, DirectionsService, InfoContent, MapCanvas, MarkerSpec,
    OverlayId, RoutePath, SINGLE_POINT_ZOOM,
};
use crate::route::build_route_request;

/// What a render pass ended up drawing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderOutcome {
    /// No destinations; the map was cleared.
    Empty,
    /// One destination, centered.
    Single { destination_id: DbId },
    /// A driving route through every destination.
    Route { route: RoutePath },
    /// Routing failed; one numbered marker per destination.
    Markers { count: usize, reason: String },
    /// A newer pass started while this one waited for directions.
    Superseded,
}

/// The per-view surfaces a [`RouteRenderer`] draws on.
#[derive(Clone)]
pub struct MapHandles {
    pub canvas: Arc<dyn MapCanvas>,
    pub directions: Arc<dyn DirectionsService>,
    pub renderer: Arc<dyn DirectionsRenderer>,
}

/// Draws a trip's destinations onto one map.
pub struct RouteRenderer {
    handles: MapHandles,
    /// Markers created by earlier passes.
    overlays: Mutex<Vec<OverlayId>>,
    generation: AtomicU64,
    event_tx: broadcast::Sender<MapSessionEvent>,
}

impl RouteRenderer {
    pub fn new(handles: MapHandles, event_tx: broadcast::Sender<MapSessionEvent>) -> Self {
        Self {
            handles,
            overlays: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
            event_tx,
        }
    }

    /// Number of markers currently owned by this renderer.
    pub fn overlay_count(&self) -> usize {
        self.lock_overlays().len()
    }

    /// Redraw the map for `destinations`.
    pub async fn render(&self, destinations: &[Destination]) -> RenderOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.clear();

        let sorted = sorted_by_order(destinations);
        match sorted.as_slice() {
            [] => RenderOutcome::Empty,
            [only] => {
                let id = self.handles.canvas.add_marker(MarkerSpec {
                    position: only.position(),
                    title: only.name.clone(),
                    label: None,
                    info: None,
                });
                self.lock_overlays().push(id);
                self.handles.canvas.set_center(only.position());
                self.handles.canvas.set_zoom(SINGLE_POINT_ZOOM);
                RenderOutcome::Single {
                    destination_id: only.id,
                }
            }
            _ => self.render_route(generation, &sorted).await,
        }
    }

    /// Remove the drawn route and every tracked marker.
    pub fn clear(&self) {
        self.handles.renderer.clear();
        let ids: Vec<OverlayId> = self.lock_overlays().drain(..).collect();
        for id in ids {
            self.handles.canvas.remove_overlay(id);
        }
    }

    // ---- private helpers ----

    async fn render_route(&self, generation: u64, sorted: &[Destination]) -> RenderOutcome {
        let result = match build_route_request(sorted) {
            Some(request) => self.handles.directions.route(&request).await,
            None => Err(MapError::Directions("route needs two stops".to_string())),
        };

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Dropping stale directions response");
            let _ = self
                .event_tx
                .send(MapSessionEvent::RenderSuperseded { generation });
            return RenderOutcome::Superseded;
        }

        let reason = match result {
            Ok(result) => match (result.status.is_ok(), result.route) {
                (true, Some(route)) => {
                    self.handles.renderer.set_directions(&route);
                    tracing::info!(
                        generation,
                        stops = sorted.len(),
                        distance_m = route.total_distance_meters(),
                        "Route rendered",
                    );
                    let _ = self.event_tx.send(MapSessionEvent::RouteRendered {
                        generation,
                        stops: sorted.len(),
                        distance_meters: Some(route.total_distance_meters()),
                    });
                    return RenderOutcome::Route { route };
                }
                (true, None) => "provider returned no route".to_string(),
                (false, _) => format!("directions status {}", result.status),
            },
            Err(e) => e.to_string(),
        };

        tracing::warn!(generation, reason = %reason, "Falling back to markers");
        let count = self.draw_markers(sorted);
        let _ = self.event_tx.send(MapSessionEvent::MarkerFallback {
            generation,
            markers: count,
            reason: reason.clone(),
        });
        RenderOutcome::Markers { count, reason }
    }

    /// Draw one numbered marker per stop and fit the viewport to them.
    fn draw_markers(&self, sorted: &[Destination]) -> usize {
        let mut ids = Vec::with_capacity(sorted.len());
        for (i, dest) in sorted.iter().enumerate() {
            ids.push(self.handles.canvas.add_marker(MarkerSpec {
                position: dest.position(),
                title: dest.name.clone(),
                label: Some((i + 1).to_string()),
                info: Some(InfoContent {
                    name: dest.name.clone(),
                    address: dest.address.clone(),
                    notes: dest.notes.clone(),
                }),
            }));
        }

        if let [only] = sorted {
            self.handles.canvas.set_center(only.position());
            self.handles.canvas.set_zoom(SINGLE_POINT_ZOOM);
        } else if let Some(bounds) = Bounds::containing(sorted.iter().map(Destination::position)) {
            self.handles.canvas.fit_bounds(bounds);
        }

        let count = ids.len();
        self.lock_overlays().extend(ids);
        count
    }

    fn lock_overlays(&self) -> std::sync::MutexGuard<'_, Vec<OverlayId>> {
        self.overlays
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
