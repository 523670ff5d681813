//! Trip destination model and ordering helpers.
//!
//! `order_index` is the authoritative visit order within a trip. Indices
//! are unique per trip but need not be contiguous, so callers must sort
//! rather than index by them.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, LatLng, Timestamp};

/// A destination row as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub visit_date: Option<NaiveDate>,
    #[serde(default)]
    pub visit_time: Option<NaiveTime>,
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub media_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Destination {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

/// Return a copy of `destinations` sorted ascending by `order_index`.
///
/// The sort is stable, so destinations sharing an index keep the order
/// the backend returned them in.
pub fn sorted_by_order(destinations: &[Destination]) -> Vec<Destination> {
    let mut sorted = destinations.to_vec();
    sorted.sort_by_key(|d| d.order_index);
    sorted
}

/// DTO for adding a destination to a trip. The backend assigns
/// `order_index` as one past the current maximum.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateDestination {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub place_id: String,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
}

impl CreateDestination {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Destination name is required".into()));
        }
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude)
        {
            return Err(CoreError::Validation(format!(
                "Coordinates out of range: {}, {}",
                self.latitude, self.longitude
            )));
        }
        if let Some(minutes) = self.duration_minutes {
            if minutes < 0 {
                return Err(CoreError::Validation(
                    "Visit duration cannot be negative".into(),
                ));
            }
        }
        Ok(())
    }
}

/// DTO for updating a destination. All fields are optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDestination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
}

/// Body of the bulk-add endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BulkAddDestinations {
    pub destinations: Vec<CreateDestination>,
}

/// Body of the reorder endpoint: destination ids in their new order.
#[derive(Debug, Clone, Serialize)]
pub struct ReorderDestinations {
    pub destination_ids: Vec<DbId>,
}

/// Response of the server-side route optimizer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptimizeRouteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub total_distance: Option<f64>,
    #[serde(default)]
    pub total_duration: Option<f64>,
}
