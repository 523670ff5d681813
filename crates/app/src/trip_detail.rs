//! The trip-detail view controller.
//!
//! [`TripDetail`] owns everything one mounted trip-detail view needs: the
//! loaded trip data, the map session and its renderer, and the banner
//! slot. Mutations follow one pattern: call the backend, show a banner,
//! and on success re-fetch all trip data and redraw the map. Local state
//! is never patched in place.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tripmate_core::destination::{CreateDestination, Destination};
use tripmate_core::media::{MediaItem, MediaUpload};
use tripmate_core::place::PlaceCandidate;
use tripmate_core::types::DbId;
use tripmate_maps::provider::MapOptions;
use tripmate_maps::{LoadState, MapSession, RenderOutcome, ScriptLoader};

use crate::backend::TripBackend;
use crate::banner::{Banner, Banners};
use crate::error::{AppError, AppResult};
use crate::guard::{require_confirmation, Confirm};
use crate::loader::{load_trip_data, TripData, LOAD_FAILED_MESSAGE};

pub const OPTIMIZE_NEEDS_TWO_MESSAGE: &str = "Need at least 2 destinations to optimize route";
pub const OPTIMIZE_FAILED_MESSAGE: &str = "Failed to optimize route";
pub const OPTIMIZE_SUCCESS_MESSAGE: &str = "Route optimized successfully!";
pub const ADD_FAILED_MESSAGE: &str = "Failed to add destination";
pub const ADD_SUCCESS_MESSAGE: &str = "Destination added successfully!";
pub const REMOVE_CONFIRM_PROMPT: &str = "Are you sure you want to remove this destination?";
pub const REMOVE_FAILED_MESSAGE: &str = "Failed to remove destination";
pub const REMOVE_SUCCESS_MESSAGE: &str = "Destination removed successfully!";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload media";
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Media uploaded successfully!";
pub const SEARCH_FAILED_MESSAGE: &str = "Failed to search places. Please try again.";

/// What the view shows in place of, or alongside, the trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Loaded(TripData),
    Failed { message: String },
}

/// What the map area shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MapStatus {
    Loading,
    Ready,
    /// `retryable` is false when retrying cannot help.
    Failed { message: String, retryable: bool },
}

/// A serializable picture of the whole view.
#[derive(Debug, Clone, Serialize)]
pub struct TripDetailSnapshot {
    pub trip_id: DbId,
    pub view: ViewState,
    pub map: MapStatus,
    pub render: Option<RenderOutcome>,
    pub banner: Option<Banner>,
}

/// Controller for one mounted trip-detail view.
pub struct TripDetail {
    trip_id: DbId,
    backend: Arc<dyn TripBackend>,
    map: MapSession,
    banners: Banners,
    view: RwLock<ViewState>,
    last_render: RwLock<Option<RenderOutcome>>,
}

impl TripDetail {
    pub fn new(
        trip_id: DbId,
        backend: Arc<dyn TripBackend>,
        loader: Arc<ScriptLoader>,
        banners: Banners,
    ) -> Self {
        let map = MapSession::new(loader, format!("trip-map-{trip_id}"), MapOptions::default());
        Self {
            trip_id,
            backend,
            map,
            banners,
            view: RwLock::new(ViewState::Loading),
            last_render: RwLock::new(None),
        }
    }

    pub fn trip_id(&self) -> DbId {
        self.trip_id
    }

    /// Load the trip's data and bring up the map.
    ///
    /// Neither failure is returned: a data failure moves the view to
    /// [`ViewState::Failed`] and a map failure shows in [`Self::map_status`].
    pub async fn mount(&self) {
        tracing::info!(trip_id = self.trip_id, "Mounting trip detail");
        *self.view.write().await = ViewState::Loading;

        let (_, map) = tokio::join!(self.fetch(), self.map.start());
        if let Err(e) = map {
            tracing::warn!(trip_id = self.trip_id, error = %e, "Map unavailable");
        }
        self.render().await;
    }

    /// Re-fetch the trip's data and redraw the map. A failed fetch
    /// clears the map along with the view.
    pub async fn reload(&self) -> AppResult<()> {
        let result = self.fetch().await;
        self.render().await;
        result
    }

    /// Retry loading the map after a failure.
    pub async fn retry_map(&self) -> AppResult<()> {
        self.map.retry().await?;
        self.render().await;
        Ok(())
    }

    /// Ask the backend to reorder the destinations.
    pub async fn optimize_route(&self) -> AppResult<()> {
        let count = self.destinations().await.len();
        if count < 2 {
            self.banners.error(OPTIMIZE_NEEDS_TWO_MESSAGE);
            return Err(AppError::Rejected(OPTIMIZE_NEEDS_TWO_MESSAGE.to_string()));
        }

        tracing::info!(trip_id = self.trip_id, destination_count = count, "Optimizing route");
        let response = match self.backend.optimize_route(self.trip_id).await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e.into(), OPTIMIZE_FAILED_MESSAGE)),
        };
        if !response.success {
            let message = response
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| OPTIMIZE_FAILED_MESSAGE.to_string());
            self.banners.error(message.clone());
            return Err(AppError::Rejected(message));
        }

        self.banners.success(OPTIMIZE_SUCCESS_MESSAGE);
        self.refresh().await;
        Ok(())
    }

    /// Add a destination from a filled-in form.
    pub async fn add_destination(&self, form: &CreateDestination) -> AppResult<Destination> {
        let destination = match self.backend.add_destination(self.trip_id, form).await {
            Ok(d) => d,
            Err(e) => return Err(self.fail(e.into(), ADD_FAILED_MESSAGE)),
        };
        tracing::info!(
            trip_id = self.trip_id,
            destination_id = destination.id,
            "Destination added",
        );
        self.banners.success(ADD_SUCCESS_MESSAGE);
        self.refresh().await;
        Ok(destination)
    }

    /// Add a destination from a place search result, with its visit
    /// duration estimated from the place's category.
    pub async fn add_place(&self, candidate: &PlaceCandidate) -> AppResult<Destination> {
        self.add_destination(&candidate.to_destination()).await
    }

    /// Search for places to add. Short queries return nothing without a
    /// request.
    pub async fn search_places(&self, query: &str) -> AppResult<Vec<PlaceCandidate>> {
        self.backend
            .search_places(query)
            .await
            .map_err(|e| self.fail(e.into(), SEARCH_FAILED_MESSAGE))
    }

    /// Remove a destination once the user confirms.
    ///
    /// Declining returns [`AppError::Declined`] without any request.
    pub async fn delete_destination(
        &self,
        destination_id: DbId,
        confirm: &dyn Confirm,
    ) -> AppResult<()> {
        require_confirmation(confirm, REMOVE_CONFIRM_PROMPT)?;
        if let Err(e) = self
            .backend
            .delete_destination(self.trip_id, destination_id)
            .await
        {
            return Err(self.fail(e.into(), REMOVE_FAILED_MESSAGE));
        }
        tracing::info!(trip_id = self.trip_id, destination_id, "Destination removed");
        self.banners.success(REMOVE_SUCCESS_MESSAGE);
        self.refresh().await;
        Ok(())
    }

    pub async fn upload_media(&self, upload: MediaUpload) -> AppResult<MediaItem> {
        let item = match self.backend.upload_media(self.trip_id, upload).await {
            Ok(item) => item,
            Err(e) => return Err(self.fail(e.into(), UPLOAD_FAILED_MESSAGE)),
        };
        tracing::info!(trip_id = self.trip_id, media_id = item.id, "Media uploaded");
        self.banners.success(UPLOAD_SUCCESS_MESSAGE);
        self.refresh().await;
        Ok(item)
    }

    /// Tear down the map session and banners.
    pub fn unmount(&self) {
        self.map.teardown();
        self.banners.dismiss();
        tracing::info!(trip_id = self.trip_id, "Trip detail unmounted");
    }

    // ---- view state ----

    pub async fn view(&self) -> ViewState {
        self.view.read().await.clone()
    }

    /// Destinations of the loaded trip, empty until loaded.
    pub async fn destinations(&self) -> Vec<Destination> {
        match &*self.view.read().await {
            ViewState::Loaded(data) => data.destinations.clone(),
            _ => Vec::new(),
        }
    }

    pub fn map_status(&self) -> MapStatus {
        if self.map.is_ready() {
            return MapStatus::Ready;
        }
        match self.map.load_state() {
            LoadState::Failed { error, .. } => MapStatus::Failed {
                message: error.user_message(),
                retryable: error.is_retryable(),
            },
            LoadState::Ready { .. } => MapStatus::Ready,
            _ => MapStatus::Loading,
        }
    }

    pub async fn last_render(&self) -> Option<RenderOutcome> {
        self.last_render.read().await.clone()
    }

    pub fn banner(&self) -> Option<Banner> {
        self.banners.current()
    }

    pub fn map(&self) -> &MapSession {
        &self.map
    }

    pub async fn snapshot(&self) -> TripDetailSnapshot {
        TripDetailSnapshot {
            trip_id: self.trip_id,
            view: self.view().await,
            map: self.map_status(),
            render: self.last_render().await,
            banner: self.banner(),
        }
    }

    // ---- private helpers ----

    /// Fetch all trip data and replace the view state in one step.
    async fn fetch(&self) -> AppResult<()> {
        match load_trip_data(self.backend.as_ref(), self.trip_id).await {
            Ok(data) => {
                *self.view.write().await = ViewState::Loaded(data);
                Ok(())
            }
            Err(e) => {
                let message = e.user_message(LOAD_FAILED_MESSAGE);
                tracing::error!(trip_id = self.trip_id, error = %e, "Failed to load trip data");
                *self.view.write().await = ViewState::Failed { message };
                Err(e.into())
            }
        }
    }

    /// Re-fetch after a successful mutation. A failed re-fetch is already
    /// reflected in the view state.
    async fn refresh(&self) {
        let _ = self.reload().await;
    }

    /// Draw the current destinations, if the map is up.
    ///
    /// A superseded pass drew nothing, so the newer pass's outcome stays.
    async fn render(&self) {
        let destinations = self.destinations().await;
        match self.map.render(&destinations).await {
            None | Some(RenderOutcome::Superseded) => {}
            Some(outcome) => *self.last_render.write().await = Some(outcome),
        }
    }

    /// Show an error banner for a failed action and hand the error back.
    fn fail(&self, error: AppError, fallback: &str) -> AppError {
        let message = error.user_message(fallback);
        tracing::warn!(trip_id = self.trip_id, error = %error, "Trip detail action failed");
        self.banners.error(message);
        error
    }
}

impl Drop for TripDetail {
    fn drop(&mut self) {
        self.map.teardown();
    }
}
