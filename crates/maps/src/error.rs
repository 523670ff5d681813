//! Mapping error type.

use std::time::Duration;

/// Errors raised while loading the mapping provider or drawing on it.
///
/// Values are cloned into [`crate::LoadState::Failed`] so that every view
/// waiting on the provider sees the same failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    /// No API key was configured. Retrying cannot help.
    #[error("Google Maps API key is not configured")]
    MissingCredentials,

    /// The script tag reported an error event, or loaded without
    /// exposing the provider.
    #[error("Failed to load Google Maps: {0}")]
    ScriptLoad(String),

    /// The provider did not become available within the bounded wait.
    #[error("Timed out after {}s waiting for Google Maps to load", .waited.as_secs())]
    Timeout { waited: Duration },

    /// The view was torn down while the load was in flight.
    #[error("Map loading was cancelled")]
    Cancelled,

    /// A directions request could not be built or issued.
    #[error("Directions request failed: {0}")]
    Directions(String),

    /// The provider rejected a canvas operation.
    #[error("Map provider error: {0}")]
    Provider(String),
}

impl MapError {
    /// Whether a user-triggered retry may re-enter the loading state.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MissingCredentials)
    }

    /// Text shown in the map area when the map cannot be displayed.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredentials => {
                "Google Maps API key is missing. Add GOOGLE_MAPS_API_KEY to your configuration."
                    .to_string()
            }
            Self::Timeout { .. } => {
                "Google Maps took too long to load. Check your connection and retry.".to_string()
            }
            Self::Cancelled => "Map loading was cancelled.".to_string(),
            other => format!("Failed to load the map: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_is_terminal() {
        assert!(!MapError::MissingCredentials.is_retryable());
        assert!(MapError::ScriptLoad("error event".into()).is_retryable());
        assert!(MapError::Timeout {
            waited: Duration::from_secs(10)
        }
        .is_retryable());
    }

    #[test]
    fn timeout_message_reports_seconds() {
        let err = MapError::Timeout {
            waited: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 10s waiting for Google Maps to load"
        );
        assert!(err.user_message().contains("too long"));
    }
}
