//! Trip, destination, media, sharing, and place endpoints.

use reqwest::Method;
use tripmate_core::destination::{
    BulkAddDestinations, CreateDestination, Destination, OptimizeRouteResponse,
    ReorderDestinations, UpdateDestination,
};
use tripmate_core::media::{MediaItem, MediaQuery, MediaUpload, UpdateMedia};
use tripmate_core::place::{PlaceCandidate, PlaceSearch};
use tripmate_core::trip::{CreateTrip, ShareTrip, Trip, TripQuery, UpdateTrip};
use tripmate_core::types::DbId;

use crate::api::TripMateApi;
use crate::error::ApiError;

impl TripMateApi {
    // ---- trips ----

    pub async fn list_trips(&self, query: &TripQuery) -> Result<Vec<Trip>, ApiError> {
        self.get_json("trips/", &query.to_pairs()).await
    }

    pub async fn get_trip(&self, trip_id: DbId) -> Result<Trip, ApiError> {
        self.get_json(&format!("trips/{trip_id}/"), &[]).await
    }

    /// Create a trip. The form is validated first; an invalid form
    /// never produces a request.
    pub async fn create_trip(&self, form: &CreateTrip) -> Result<Trip, ApiError> {
        form.validate()?;
        self.send_json(Method::POST, "trips/", form).await
    }

    pub async fn update_trip(&self, trip_id: DbId, form: &UpdateTrip) -> Result<Trip, ApiError> {
        form.validate()?;
        self.send_json(Method::PATCH, &format!("trips/{trip_id}/"), form)
            .await
    }

    pub async fn delete_trip(&self, trip_id: DbId) -> Result<(), ApiError> {
        self.delete(&format!("trips/{trip_id}/")).await
    }

    pub async fn duplicate_trip(&self, trip_id: DbId) -> Result<Trip, ApiError> {
        self.send_json(
            Method::POST,
            &format!("trips/{trip_id}/duplicate/"),
            &serde_json::json!({}),
        )
        .await
    }

    /// Aggregate statistics for the current user's trips.
    pub async fn trip_stats(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json("trips/my-stats/", &[]).await
    }

    // ---- destinations ----

    pub async fn list_destinations(&self, trip_id: DbId) -> Result<Vec<Destination>, ApiError> {
        self.get_json(&format!("trips/{trip_id}/destinations/"), &[])
            .await
    }

    pub async fn add_destination(
        &self,
        trip_id: DbId,
        form: &CreateDestination,
    ) -> Result<Destination, ApiError> {
        form.validate()?;
        self.send_json(
            Method::POST,
            &format!("trips/{trip_id}/add_destination/"),
            form,
        )
        .await
    }

    pub async fn add_destinations_bulk(
        &self,
        trip_id: DbId,
        forms: Vec<CreateDestination>,
    ) -> Result<Vec<Destination>, ApiError> {
        for form in &forms {
            form.validate()?;
        }
        let body = BulkAddDestinations {
            destinations: forms,
        };
        self.send_json(
            Method::POST,
            &format!("trips/{trip_id}/add_destinations_bulk/"),
            &body,
        )
        .await
    }

    pub async fn update_destination(
        &self,
        trip_id: DbId,
        destination_id: DbId,
        form: &UpdateDestination,
    ) -> Result<Destination, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("trips/{trip_id}/destinations/{destination_id}/"),
            form,
        )
        .await
    }

    pub async fn delete_destination(
        &self,
        trip_id: DbId,
        destination_id: DbId,
    ) -> Result<(), ApiError> {
        self.delete(&format!("trips/{trip_id}/destinations/{destination_id}/"))
            .await
    }

    /// Persist a new visit order given as destination ids.
    pub async fn reorder_destinations(
        &self,
        trip_id: DbId,
        destination_ids: Vec<DbId>,
    ) -> Result<(), ApiError> {
        let body = ReorderDestinations { destination_ids };
        self.send_unit(
            Method::POST,
            &format!("trips/{trip_id}/destinations/reorder/"),
            Some(&body),
        )
        .await
    }

    /// Ask the backend to reorder destinations with its route optimizer.
    pub async fn optimize_route(&self, trip_id: DbId) -> Result<OptimizeRouteResponse, ApiError> {
        self.send_json(
            Method::POST,
            &format!("trips/{trip_id}/optimize_route/"),
            &serde_json::json!({}),
        )
        .await
    }

    // ---- media ----

    pub async fn list_media(
        &self,
        trip_id: DbId,
        query: &MediaQuery,
    ) -> Result<Vec<MediaItem>, ApiError> {
        self.get_json(&format!("trips/{trip_id}/media/"), &query.to_pairs())
            .await
    }

    /// Upload a file with its metadata as `multipart/form-data`. Unset
    /// metadata fields are omitted from the form.
    pub async fn upload_media(
        &self,
        trip_id: DbId,
        upload: MediaUpload,
    ) -> Result<MediaItem, ApiError> {
        if upload.file_name.trim().is_empty() || upload.bytes.is_empty() {
            return Err(tripmate_core::error::CoreError::Validation(
                "Please select a file to upload".into(),
            )
            .into());
        }

        let part = reqwest::multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(title) = upload.title {
            form = form.text("title", title);
        }
        if let Some(description) = upload.description {
            form = form.text("description", description);
        }
        if let Some(captured_at) = upload.captured_at {
            form = form.text("captured_at", captured_at.to_rfc3339());
        }
        if let Some(destination) = upload.destination {
            form = form.text("destination", destination.to_string());
        }

        self.send_multipart(&format!("trips/{trip_id}/upload_media/"), form)
            .await
    }

    pub async fn update_media(
        &self,
        trip_id: DbId,
        media_id: DbId,
        form: &UpdateMedia,
    ) -> Result<MediaItem, ApiError> {
        self.send_json(
            Method::PATCH,
            &format!("trips/{trip_id}/media/{media_id}/"),
            form,
        )
        .await
    }

    pub async fn delete_media(&self, trip_id: DbId, media_id: DbId) -> Result<(), ApiError> {
        self.delete(&format!("trips/{trip_id}/media/{media_id}/"))
            .await
    }

    // ---- sharing ----

    pub async fn share_trip(
        &self,
        trip_id: DbId,
        share: &ShareTrip,
    ) -> Result<serde_json::Value, ApiError> {
        if share.username.trim().is_empty() {
            return Err(
                tripmate_core::error::CoreError::Validation("Username is required".into()).into(),
            );
        }
        self.send_json(Method::POST, &format!("trips/{trip_id}/share/"), share)
            .await
    }

    pub async fn get_shared_trip(&self, share_token: &str) -> Result<Trip, ApiError> {
        self.get_json(&format!("trips/shared/{share_token}/"), &[])
            .await
    }

    pub async fn shared_with_me(&self) -> Result<Vec<Trip>, ApiError> {
        self.get_json("trips/shared-with-me/", &[]).await
    }

    // ---- places ----

    /// Search for places. Queries shorter than the minimum length return
    /// an empty list without contacting the backend.
    pub async fn search_places(&self, query: &str) -> Result<Vec<PlaceCandidate>, ApiError> {
        match PlaceSearch::new(query) {
            Some(search) => self.send_json(Method::POST, "trips/search-places/", &search).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn place_details(&self, place_id: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(&format!("trips/place-details/{place_id}/"), &[])
            .await
    }
}
