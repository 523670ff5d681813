//! Place search candidates and visit-duration estimation.

use serde::{Deserialize, Serialize};

use crate::destination::CreateDestination;

/// Minimum query length before a place search is issued.
pub const MIN_QUERY_LEN: usize = 3;

/// Default search radius in metres.
pub const DEFAULT_SEARCH_RADIUS_M: u32 = 50_000;

/// Visit duration in minutes when no category tag matches.
pub const DEFAULT_VISIT_MINUTES: i32 = 60;

/// Typical visit length, in minutes, per place category tag.
const VISIT_DURATIONS: &[(&str, i32)] = &[
    ("museum", 120),
    ("amusement_park", 240),
    ("zoo", 180),
    ("park", 90),
    ("restaurant", 90),
    ("tourist_attraction", 120),
    ("shopping_mall", 120),
    ("church", 45),
    ("art_gallery", 90),
    ("aquarium", 120),
    ("casino", 180),
    ("night_club", 180),
    ("spa", 120),
    ("gym", 90),
    ("movie_theater", 150),
];

/// A place returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub photos: Vec<serde_json::Value>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl PlaceCandidate {
    /// Prefill a destination form from this candidate.
    pub fn to_destination(&self) -> CreateDestination {
        CreateDestination {
            name: self.name.clone(),
            address: self.address.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            place_id: self.place_id.clone(),
            notes: String::new(),
            visit_date: None,
            visit_time: None,
            duration_minutes: Some(estimate_visit_duration(&self.types)),
        }
    }
}

/// Body of the place search endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceSearch {
    pub query: String,
    pub radius: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<crate::types::LatLng>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
}

impl PlaceSearch {
    /// Build a search for `query`, or `None` when the trimmed query is
    /// too short to be worth sending.
    pub fn new(query: &str) -> Option<Self> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return None;
        }
        Some(Self {
            query: query.to_string(),
            radius: DEFAULT_SEARCH_RADIUS_M,
            location: None,
            place_type: None,
        })
    }
}

/// Estimate how long to stay at a place from its category tags.
///
/// Tags are checked in the order given; the first one with a known
/// duration wins.
pub fn estimate_visit_duration(types: &[String]) -> i32 {
    types
        .iter()
        .find_map(|t| {
            VISIT_DURATIONS
                .iter()
                .find(|(name, _)| *name == t.as_str())
                .map(|(_, minutes)| *minutes)
        })
        .unwrap_or(DEFAULT_VISIT_MINUTES)
}
