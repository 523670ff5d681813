//! A map bound to one mounted view.
//!
//! [`MapSession`] asks the shared [`ScriptLoader`] for the provider and,
//! the first time it succeeds, creates the view's canvas, directions
//! service, and directions renderer. Later readiness notifications reuse
//! them. Tearing the session down cancels any load it is waiting on.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tripmate_core::destination::Destination;

use crate::error::MapError;
use crate::events::MapSessionEvent;
use crate::loader::{LoadState, ScriptLoader};
use crate::provider::{MapOptions, MapProvider};
use crate::renderer::{MapHandles, RenderOutcome, RouteRenderer};

/// Map state of one view.
pub struct MapSession {
    loader: Arc<ScriptLoader>,
    container: String,
    options: MapOptions,
    renderer: OnceCell<RouteRenderer>,
    cancel: CancellationToken,
}

impl MapSession {
    pub fn new(loader: Arc<ScriptLoader>, container: impl Into<String>, options: MapOptions) -> Self {
        Self {
            loader,
            container: container.into(),
            options,
            renderer: OnceCell::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Load the provider if needed and initialize this view's map.
    ///
    /// Safe to call repeatedly; the map is created at most once.
    pub async fn start(&self) -> Result<&RouteRenderer, MapError> {
        if let Some(renderer) = self.renderer.get() {
            return Ok(renderer);
        }
        if self.cancel.is_cancelled() {
            return Err(MapError::Cancelled);
        }
        let provider = self.loader.ensure_loaded(&self.cancel).await?;
        self.renderer
            .get_or_try_init(|| async { self.initialize(provider.as_ref()) })
            .await
    }

    /// User-triggered retry after a failed load.
    ///
    /// Refused with [`MapError::MissingCredentials`] when no API key is
    /// configured.
    pub async fn retry(&self) -> Result<&RouteRenderer, MapError> {
        if let Some(err) = self.loader.state().error() {
            if !err.is_retryable() {
                return Err(err.clone());
            }
        }
        tracing::info!(container = %self.container, "Retrying map load");
        self.start().await
    }

    /// Draw `destinations` if the map is initialized. Returns `None` while
    /// it is not.
    pub async fn render(&self, destinations: &[Destination]) -> Option<RenderOutcome> {
        let renderer = self.renderer.get()?;
        Some(renderer.render(destinations).await)
    }

    pub fn is_ready(&self) -> bool {
        self.renderer.initialized()
    }

    pub fn load_state(&self) -> LoadState {
        self.loader.state()
    }

    pub fn renderer(&self) -> Option<&RouteRenderer> {
        self.renderer.get()
    }

    /// Cancel any pending load and clear what this view drew.
    pub fn teardown(&self) {
        self.cancel.cancel();
        if let Some(renderer) = self.renderer.get() {
            renderer.clear();
        }
        tracing::debug!(container = %self.container, "Map session torn down");
    }

    // ---- private helpers ----

    fn initialize(&self, provider: &dyn MapProvider) -> Result<RouteRenderer, MapError> {
        let canvas = provider.create_map(&self.container, &self.options)?;
        let renderer = provider.directions_renderer(&canvas);
        let handles = MapHandles {
            canvas,
            directions: provider.directions_service(),
            renderer,
        };
        tracing::info!(container = %self.container, "Map initialized");
        let events = self.loader.events();
        let _ = events.send(MapSessionEvent::MapInitialized {
            container: self.container.clone(),
        });
        Ok(RouteRenderer::new(handles, events))
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
