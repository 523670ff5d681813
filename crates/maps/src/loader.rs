//! Process-wide loading of the mapping provider script.
//!
//! A single [`ScriptLoader`] is shared by every view that shows a map, so
//! the provider script is injected at most once however many times a view
//! mounts. Each load attempt is a timed wait raced against the caller's
//! [`CancellationToken`]:
//!
//! - provider global already present: Ready, nothing injected;
//! - script tag already present: poll for the global until the timeout;
//! - otherwise: inject the tag and wait for its load or error event.
//!
//! Attempts are numbered. A result is only committed if it belongs to the
//! latest attempt, so a load that finishes after its attempt has been
//! abandoned cannot flip the state back to Ready.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::MapError;
use crate::events::MapSessionEvent;
use crate::provider::{MapProvider, ScriptHost};

/// Prefix shared by every provider script URL.
pub const SCRIPT_URL_PREFIX: &str = "https://maps.googleapis.com/maps/api/js";

/// How long to wait for the provider before giving up.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between checks for the provider global when waiting on an
/// existing script tag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Broadcast channel capacity for map events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Full script URL for `api_key`.
pub fn script_url(api_key: &str) -> String {
    format!("{SCRIPT_URL_PREFIX}?key={api_key}&libraries=places")
}

/// Where the provider script stands.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    Unloaded,
    Loading { attempt: u64 },
    /// `attempt` is 0 when the provider was present before any attempt.
    Ready { attempt: u64 },
    Failed { attempt: u64, error: MapError },
}

impl LoadState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn error(&self) -> Option<&MapError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Loads the provider script once and hands out the provider.
///
/// Created once at startup. The returned `Arc` is cloned into every view.
pub struct ScriptLoader {
    host: Arc<dyn ScriptHost>,
    api_key: Option<String>,
    timeout: Duration,
    state: watch::Sender<LoadState>,
    /// Number of the most recent attempt.
    attempt: AtomicU64,
    /// Serializes attempts so only one tag is ever injected.
    load_lock: Mutex<()>,
    event_tx: broadcast::Sender<MapSessionEvent>,
}

impl ScriptLoader {
    pub fn new(host: Arc<dyn ScriptHost>, api_key: Option<String>, timeout: Duration) -> Arc<Self> {
        let (state, _) = watch::channel(LoadState::Unloaded);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            host,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout,
            state,
            attempt: AtomicU64::new(0),
            load_lock: Mutex::new(()),
            event_tx,
        })
    }

    /// Subscribe to map events from the loader and every renderer built
    /// on it.
    pub fn subscribe(&self) -> broadcast::Receiver<MapSessionEvent> {
        self.event_tx.subscribe()
    }

    /// Observe state changes.
    pub fn watch_state(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    pub(crate) fn events(&self) -> broadcast::Sender<MapSessionEvent> {
        self.event_tx.clone()
    }

    /// Make the provider available, running a load attempt if needed.
    ///
    /// A missing API key fails immediately with
    /// [`MapError::MissingCredentials`] on every call. Cancelling `cancel`
    /// abandons the attempt and returns the loader to `Unloaded`.
    pub async fn ensure_loaded(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn MapProvider>, MapError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::error!("Google Maps API key is not configured");
            self.state.send_replace(LoadState::Failed {
                attempt: self.attempt.load(Ordering::SeqCst),
                error: MapError::MissingCredentials,
            });
            return Err(MapError::MissingCredentials);
        };

        if let Some(provider) = self.already_available() {
            return Ok(provider);
        }

        let _guard = tokio::select! {
            _ = cancel.cancelled() => return Err(MapError::Cancelled),
            guard = self.load_lock.lock() => guard,
        };

        // Another view may have finished loading while we queued.
        if let Some(provider) = self.already_available() {
            return Ok(provider);
        }

        let attempt = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;
        let inject = !self.host.has_script_tag(SCRIPT_URL_PREFIX);
        tracing::info!(attempt, inject, "Loading Google Maps");
        self.state.send_replace(LoadState::Loading { attempt });
        let _ = self.event_tx.send(MapSessionEvent::ScriptLoading {
            attempt,
            injected: inject,
        });

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(MapError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, self.run_attempt(api_key, inject)) => {
                outcome.unwrap_or(Err(MapError::Timeout { waited: self.timeout }))
            }
        };

        self.commit(attempt, result)
    }

    // ---- private helpers ----

    fn already_available(&self) -> Option<Arc<dyn MapProvider>> {
        let provider = self.host.provider()?;
        let ready = self.state.borrow().is_ready();
        if !ready {
            let attempt = self.attempt.load(Ordering::SeqCst);
            self.state.send_replace(LoadState::Ready { attempt });
        }
        Some(provider)
    }

    async fn run_attempt(&self, api_key: &str, inject: bool) -> Result<Arc<dyn MapProvider>, MapError> {
        if !inject {
            loop {
                if let Some(provider) = self.host.provider() {
                    return Ok(provider);
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        if let Err(e) = self.host.load_script(&script_url(api_key)).await {
            // A tag that fired its error event never loads; drop it so a
            // retry injects a fresh one.
            self.host.remove_script_tag(SCRIPT_URL_PREFIX);
            return Err(MapError::ScriptLoad(e));
        }
        self.host.provider().ok_or_else(|| {
            MapError::ScriptLoad("script loaded but the provider is unavailable".to_string())
        })
    }

    fn commit(
        &self,
        attempt: u64,
        result: Result<Arc<dyn MapProvider>, MapError>,
    ) -> Result<Arc<dyn MapProvider>, MapError> {
        if self.attempt.load(Ordering::SeqCst) != attempt {
            tracing::debug!(attempt, "Discarding result of superseded load attempt");
            return result.and(Err(MapError::Cancelled));
        }

        match &result {
            Ok(_) => {
                tracing::info!(attempt, "Google Maps ready");
                self.state.send_replace(LoadState::Ready { attempt });
                let _ = self.event_tx.send(MapSessionEvent::ScriptReady { attempt });
            }
            Err(MapError::Cancelled) => {
                tracing::info!(attempt, "Google Maps load cancelled");
                self.state.send_replace(LoadState::Unloaded);
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "Google Maps failed to load");
                self.state.send_replace(LoadState::Failed {
                    attempt,
                    error: e.clone(),
                });
                let _ = self.event_tx.send(MapSessionEvent::ScriptFailed {
                    attempt,
                    error: e.to_string(),
                });
            }
        }
        result
    }
}
