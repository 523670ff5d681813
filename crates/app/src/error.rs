use tripmate_client::session::SessionError;
use tripmate_client::ApiError;
use tripmate_core::error::CoreError;
use tripmate_maps::MapError;

use crate::config::ConfigError;

/// Application-level error type for view actions.
///
/// Wraps the per-crate errors and adds the rejections the view makes on
/// its own. [`AppError::user_message`] is the one place any of them is
/// turned into text for the user.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Local form validation failed; nothing was sent.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The map could not be loaded.
    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The action was refused before any request, e.g. optimizing a route
    /// with fewer than two stops.
    #[error("{0}")]
    Rejected(String),

    /// A private route was opened without a stored session.
    #[error("Please log in to continue")]
    NotAuthenticated,

    /// An admin route was opened by a non-staff user.
    #[error("You do not have permission to view this page")]
    Forbidden,

    /// The user declined a destructive action.
    #[error("Action cancelled")]
    Declined,
}

/// Convenience type alias for view actions.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Message to show the user. `fallback` is used for backend failures
    /// that carry no usable message of their own.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Core(core) => core.user_message(),
            AppError::Api(api) => api.user_message(fallback),
            AppError::Map(map) => map.user_message(),
            AppError::Session(e) => {
                tracing::error!(error = %e, "Session storage failed");
                fallback.to_string()
            }
            AppError::Config(e) => e.to_string(),
            AppError::Rejected(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_text_is_shown_verbatim() {
        let err = AppError::from(CoreError::Validation("Title is required".into()));
        assert_eq!(err.user_message("Failed to create trip"), "Title is required");
    }

    #[test]
    fn backend_failures_use_the_fallback() {
        let err = AppError::from(ApiError::Status {
            status: 500,
            body: "<html>oops</html>".into(),
        });
        assert_eq!(err.user_message("Failed to add destination"), "Failed to add destination");
    }

    #[test]
    fn rejections_and_guards() {
        assert_eq!(
            AppError::Rejected("Need at least 2 destinations to optimize route".into())
                .user_message("x"),
            "Need at least 2 destinations to optimize route"
        );
        assert_eq!(AppError::NotAuthenticated.user_message("x"), "Please log in to continue");
    }

    #[test]
    fn missing_map_key_explains_itself() {
        let err = AppError::from(MapError::MissingCredentials);
        assert!(err.user_message("x").contains("GOOGLE_MAPS_API_KEY"));
    }
}
