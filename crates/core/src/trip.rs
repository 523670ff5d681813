//! Trip entity model, DTOs, and client-side form rules.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Message shown when a trip form has its dates the wrong way round.
pub const END_BEFORE_START_MESSAGE: &str = "End date must be after start date";

/// Trip lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    #[default]
    Planning,
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for TripStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(Self::Planning),
            "upcoming" => Ok(Self::Upcoming),
            "ongoing" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!("Unknown trip status: {other}"))),
        }
    }
}

/// Who can see a trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPrivacy {
    #[default]
    Private,
    Shared,
    Public,
}

impl std::str::FromStr for TripPrivacy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Self::Private),
            "shared" => Ok(Self::Shared),
            "public" => Ok(Self::Public),
            other => Err(CoreError::Validation(format!("Unknown privacy: {other}"))),
        }
    }
}

/// A trip as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: TripStatus,
    #[serde(default)]
    pub privacy: TripPrivacy,
    #[serde(default)]
    pub share_token: Option<String>,
    /// Total route distance in kilometres, set by route optimization.
    #[serde(default)]
    pub total_distance: Option<f64>,
    /// Total route duration in minutes, set by route optimization.
    #[serde(default)]
    pub total_duration: Option<i64>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

impl Trip {
    /// Inclusive length of the trip in days, when both dates are known.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((end - start).num_days() + 1),
            _ => None,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self.privacy, TripPrivacy::Shared | TripPrivacy::Public)
    }
}

/// DTO for creating a new trip.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateTrip {
    pub title: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: TripStatus,
    pub privacy: TripPrivacy,
}

impl CreateTrip {
    /// Check the form before it is sent to the backend.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("Title is required".into()));
        }
        validate_date_range(self.start_date, self.end_date)
    }
}

/// DTO for updating an existing trip. All fields are optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateTrip {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TripStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<TripPrivacy>,
}

impl UpdateTrip {
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(CoreError::Validation("Title is required".into()));
            }
        }
        validate_date_range(self.start_date, self.end_date)
    }
}

/// Filters for the trip list endpoint.
#[derive(Debug, Clone, Default)]
pub struct TripQuery {
    pub status: Option<TripStatus>,
    pub search: Option<String>,
}

impl TripQuery {
    /// Query-string pairs, omitting unset filters.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Request body for sharing a trip with another user.
#[derive(Debug, Clone, Serialize)]
pub struct ShareTrip {
    pub username: String,
    pub can_edit: bool,
}

/// Reject a date range whose start falls after its end.
///
/// Either bound may be absent, in which case there is nothing to compare.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), CoreError> {
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(CoreError::Validation(END_BEFORE_START_MESSAGE.into()));
        }
    }
    Ok(())
}

/// Format a duration in minutes as `"{h}h {m}m"`, or `N/A` when unknown.
pub fn format_duration(minutes: Option<i64>) -> String {
    match minutes {
        Some(m) => format!("{}h {}m", m / 60, m % 60),
        None => "N/A".to_string(),
    }
}

/// Format a distance in kilometres with one decimal.
pub fn format_distance(km: f64) -> String {
    format!("{km:.1} km")
}
