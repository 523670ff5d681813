//! TripMate domain types and client-side rules.
//!
//! Pure logic only: models mirroring the backend's JSON, form
//! validation, ordering helpers, and small formatting utilities.

pub mod destination;
pub mod error;
pub mod media;
pub mod place;
pub mod trip;
pub mod types;
pub mod user;
