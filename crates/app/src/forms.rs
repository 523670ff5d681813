//! Turning user-entered text into validated request forms.
//!
//! Each builder checks its form the same way the backend would before
//! anything is sent, so a rejected form never costs a request.

use std::path::Path;

use chrono::NaiveDate;
use tripmate_core::error::CoreError;
use tripmate_core::media::MediaUpload;
use tripmate_core::trip::{CreateTrip, TripPrivacy, TripStatus};
use tripmate_core::types::DbId;

/// Raw trip form fields as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct TripInput {
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub privacy: Option<String>,
}

/// Parse a `YYYY-MM-DD` date for the field named `label`.
pub fn parse_date(label: &str, value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("{label} must be a date in YYYY-MM-DD format")))
}

fn parse_optional_date(label: &str, value: Option<&str>) -> Result<Option<NaiveDate>, CoreError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| parse_date(label, v))
        .transpose()
}

/// Build and validate a trip creation form.
pub fn trip_form(input: &TripInput) -> Result<CreateTrip, CoreError> {
    let form = CreateTrip {
        title: input.title.trim().to_string(),
        description: input.description.clone().unwrap_or_default(),
        start_date: parse_optional_date("Start date", input.start_date.as_deref())?,
        end_date: parse_optional_date("End date", input.end_date.as_deref())?,
        status: input
            .status
            .as_deref()
            .map(str::parse::<TripStatus>)
            .transpose()?
            .unwrap_or_default(),
        privacy: input
            .privacy
            .as_deref()
            .map(str::parse::<TripPrivacy>)
            .transpose()?
            .unwrap_or_default(),
    };
    form.validate()?;
    Ok(form)
}

/// Read a file from disk into an upload.
pub fn media_upload(
    path: &Path,
    title: Option<String>,
    description: Option<String>,
    destination: Option<DbId>,
) -> Result<MediaUpload, CoreError> {
    let bytes = std::fs::read(path).map_err(|e| {
        CoreError::Validation(format!("Could not read {}: {e}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(MediaUpload {
        file_name,
        bytes,
        title,
        description,
        captured_at: None,
        destination,
    })
}
