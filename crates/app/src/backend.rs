//! The backend calls the trip-detail view makes.
//!
//! [`TripBackend`] is implemented for [`TripMateApi`]; tests substitute an
//! in-memory backend.

use async_trait::async_trait;
use tripmate_client::{ApiError, TripMateApi};
use tripmate_core::destination::{CreateDestination, Destination, OptimizeRouteResponse};
use tripmate_core::media::{MediaItem, MediaQuery, MediaUpload};
use tripmate_core::place::PlaceCandidate;
use tripmate_core::trip::Trip;
use tripmate_core::types::DbId;

#[async_trait]
pub trait TripBackend: Send + Sync {
    async fn get_trip(&self, trip_id: DbId) -> Result<Trip, ApiError>;

    async fn list_destinations(&self, trip_id: DbId) -> Result<Vec<Destination>, ApiError>;

    async fn list_media(&self, trip_id: DbId) -> Result<Vec<MediaItem>, ApiError>;

    async fn add_destination(
        &self,
        trip_id: DbId,
        form: &CreateDestination,
    ) -> Result<Destination, ApiError>;

    async fn delete_destination(&self, trip_id: DbId, destination_id: DbId)
        -> Result<(), ApiError>;

    async fn optimize_route(&self, trip_id: DbId) -> Result<OptimizeRouteResponse, ApiError>;

    async fn upload_media(&self, trip_id: DbId, upload: MediaUpload)
        -> Result<MediaItem, ApiError>;

    async fn search_places(&self, query: &str) -> Result<Vec<PlaceCandidate>, ApiError>;
}

#[async_trait]
impl TripBackend for TripMateApi {
    async fn get_trip(&self, trip_id: DbId) -> Result<Trip, ApiError> {
        TripMateApi::get_trip(self, trip_id).await
    }

    async fn list_destinations(&self, trip_id: DbId) -> Result<Vec<Destination>, ApiError> {
        TripMateApi::list_destinations(self, trip_id).await
    }

    async fn list_media(&self, trip_id: DbId) -> Result<Vec<MediaItem>, ApiError> {
        TripMateApi::list_media(self, trip_id, &MediaQuery::default()).await
    }

    async fn add_destination(
        &self,
        trip_id: DbId,
        form: &CreateDestination,
    ) -> Result<Destination, ApiError> {
        TripMateApi::add_destination(self, trip_id, form).await
    }

    async fn delete_destination(
        &self,
        trip_id: DbId,
        destination_id: DbId,
    ) -> Result<(), ApiError> {
        TripMateApi::delete_destination(self, trip_id, destination_id).await
    }

    async fn optimize_route(&self, trip_id: DbId) -> Result<OptimizeRouteResponse, ApiError> {
        TripMateApi::optimize_route(self, trip_id).await
    }

    async fn upload_media(
        &self,
        trip_id: DbId,
        upload: MediaUpload,
    ) -> Result<MediaItem, ApiError> {
        TripMateApi::upload_media(self, trip_id, upload).await
    }

    async fn search_places(&self, query: &str) -> Result<Vec<PlaceCandidate>, ApiError> {
        TripMateApi::search_places(self, query).await
    }
}
