//! Map presentation for a trip's route.
//!
//! The mapping provider is reached through the traits in [`provider`]:
//! a [`provider::ScriptHost`] stands in for the document that holds the
//! provider's script tag and global object, and the map canvas,
//! directions service, and directions renderer are created from the
//! provider once it is loaded.
//!
//! - [`loader`] owns the process-wide script-load state machine.
//! - [`session`] binds a loaded provider to one mounted view.
//! - [`route`] builds the directions request from a destination list.
//! - [`renderer`] draws the route, or labelled markers when routing fails.
//! - [`google`] talks to the Google Directions web service.
//! - [`scene`] is an in-memory canvas that records what was drawn.

pub mod error;
pub mod events;
pub mod google;
pub mod loader;
pub mod provider;
pub mod renderer;
pub mod route;
pub mod scene;
pub mod session;

pub use error::MapError;
pub use events::MapSessionEvent;
pub use loader::{LoadState, ScriptLoader};
pub use renderer::{RenderOutcome, RouteRenderer};
pub use session::MapSession;
