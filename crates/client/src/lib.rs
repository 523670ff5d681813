//! TripMate REST client.
//!
//! Typed wrappers over the backend's trip, destination, media, place,
//! account, and admin endpoints, plus the persisted auth session.

pub mod accounts;
pub mod api;
pub mod error;
pub mod session;
pub mod trips;

pub use api::TripMateApi;
pub use error::ApiError;
