//! TripMate trip-detail workflow.
//!
//! Wires the REST client and the map layer into the trip-detail view:
//! loading a trip's data, drawing its route, and the mutations a user can
//! make from that view, with transient banners reporting the outcome. The
//! `tripmate` binary drives it from the command line.

pub mod backend;
pub mod banner;
pub mod config;
pub mod error;
pub mod forms;
pub mod guard;
pub mod loader;
pub mod trip_detail;

pub use error::AppError;
pub use trip_detail::TripDetail;
