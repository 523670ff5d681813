use std::path::PathBuf;
use std::time::Duration;

use tripmate_client::api::DEFAULT_API_URL;

/// Errors in environment-provided configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },
}

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for a locally running backend.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the REST API.
    pub api_url: String,
    /// Google Maps key. `None` makes every map load fail with a
    /// missing-credentials error.
    pub google_maps_api_key: Option<String>,
    /// Where the auth session document is kept.
    pub session_path: PathBuf,
    /// How long to wait for the maps script.
    pub maps_script_timeout: Duration,
    pub success_banner: Duration,
    pub error_banner: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                       |
    /// |----------------------------|-------------------------------|
    /// | `TRIPMATE_API_URL`         | `http://localhost:8000/api/`  |
    /// | `GOOGLE_MAPS_API_KEY`      | unset                         |
    /// | `TRIPMATE_SESSION_PATH`    | `.tripmate/session.json`      |
    /// | `MAPS_SCRIPT_TIMEOUT_SECS` | `10`                          |
    /// | `SUCCESS_BANNER_SECS`      | `3`                           |
    /// | `ERROR_BANNER_SECS`        | `5`                           |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                          |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("TRIPMATE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());

        let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let session_path = lookup("TRIPMATE_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".tripmate/session.json"));

        let seconds = |var: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match lookup(var) {
                None => Ok(Duration::from_secs(default)),
                Some(value) => value
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::InvalidSeconds { var, value }),
            }
        };

        Ok(Self {
            api_url,
            google_maps_api_key,
            session_path,
            maps_script_timeout: seconds("MAPS_SCRIPT_TIMEOUT_SECS", 10)?,
            success_banner: seconds("SUCCESS_BANNER_SECS", 3)?,
            error_banner: seconds("ERROR_BANNER_SECS", 5)?,
            request_timeout: seconds("REQUEST_TIMEOUT_SECS", 30)?,
        })
    }
}
