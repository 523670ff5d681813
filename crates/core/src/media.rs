//! Trip media model, upload metadata, and file helpers.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "aac"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaType {
    /// Infer the media type from a file name's extension.
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = std::path::Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Audio
        } else {
            Self::Document
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
        }
    }
}

/// A media item attached to a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: DbId,
    pub media_type: MediaType,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub captured_at: Option<Timestamp>,
    #[serde(default)]
    pub destination: Option<DbId>,
    #[serde(default)]
    pub is_flagged: bool,
}

/// Filters for the media list endpoint.
#[derive(Debug, Clone, Default)]
pub struct MediaQuery {
    pub media_type: Option<MediaType>,
    pub destination: Option<DbId>,
}

impl MediaQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(t) = self.media_type {
            pairs.push(("type", t.as_str().to_string()));
        }
        if let Some(d) = self.destination {
            pairs.push(("destination", d.to_string()));
        }
        pairs
    }
}

/// Metadata sent alongside an uploaded file.
#[derive(Debug, Clone, Default)]
pub struct MediaUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub captured_at: Option<Timestamp>,
    pub destination: Option<DbId>,
}

/// Editable media fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateMedia {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<DbId>,
}

/// Render a byte count as e.g. `"1.5 MB"`.
pub fn format_file_size(bytes: i64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{size:.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1} TB")
}
