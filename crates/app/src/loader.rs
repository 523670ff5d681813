//! Fetching everything the trip-detail view shows.

use serde::Serialize;
use tripmate_client::ApiError;
use tripmate_core::destination::Destination;
use tripmate_core::media::MediaItem;
use tripmate_core::trip::Trip;
use tripmate_core::types::DbId;

use crate::backend::TripBackend;

/// Message shown when the trip's data cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to fetch trip data";

/// A trip with its destinations and media, fetched together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripData {
    pub trip: Trip,
    pub destinations: Vec<Destination>,
    pub media: Vec<MediaItem>,
}

/// Fetch the trip, its destinations, and its media concurrently.
///
/// Succeeds only if all three requests do; the first failure is returned
/// and nothing else is kept.
pub async fn load_trip_data(backend: &dyn TripBackend, trip_id: DbId) -> Result<TripData, ApiError> {
    let (trip, destinations, media) = tokio::try_join!(
        backend.get_trip(trip_id),
        backend.list_destinations(trip_id),
        backend.list_media(trip_id),
    )?;

    tracing::debug!(
        trip_id,
        destination_count = destinations.len(),
        media_count = media.len(),
        "Trip data loaded",
    );
    Ok(TripData {
        trip,
        destinations,
        media,
    })
}
