//! Map events broadcast to observers.
//!
//! Published by [`crate::ScriptLoader`] and [`crate::RouteRenderer`] on a
//! shared [`tokio::sync::broadcast`] channel. Nothing depends on them
//! being received; they exist for views and logs.

use serde::Serialize;

/// A state change in the mapping layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MapSessionEvent {
    /// A load attempt started. `injected` is false when an existing
    /// script tag is being waited on instead.
    ScriptLoading { attempt: u64, injected: bool },

    /// The provider global became available.
    ScriptReady { attempt: u64 },

    /// A load attempt failed.
    ScriptFailed { attempt: u64, error: String },

    /// A view created its canvas, directions service, and renderer.
    MapInitialized { container: String },

    /// A driving route was drawn through every destination.
    RouteRendered {
        generation: u64,
        stops: usize,
        /// Sum of leg distances, when the provider reported them.
        distance_meters: Option<u64>,
    },

    /// Routing failed and numbered markers were drawn instead.
    MarkerFallback {
        generation: u64,
        markers: usize,
        reason: String,
    },

    /// A route response arrived after a newer render pass began.
    RenderSuperseded { generation: u64 },
}
