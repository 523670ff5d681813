//! Directions request construction.

use tripmate_core::destination::{sorted_by_order, Destination};

use crate::provider::{RouteRequest, TravelMode, UnitSystem, Waypoint};

/// Build a driving route through `destinations` in `order_index` order.
///
/// The first stop is the origin, the last the destination, and every stop
/// in between a stopover waypoint. Returns `None` for fewer than two
/// destinations.
pub fn build_route_request(destinations: &[Destination]) -> Option<RouteRequest> {
    let sorted = sorted_by_order(destinations);
    let (first, rest) = sorted.split_first()?;
    let (last, interior) = rest.split_last()?;

    Some(RouteRequest {
        origin: first.position(),
        destination: last.position(),
        waypoints: interior
            .iter()
            .map(|d| Waypoint {
                location: d.position(),
                stopover: true,
            })
            .collect(),
        travel_mode: TravelMode::Driving,
        unit_system: UnitSystem::Metric,
        avoid_tolls: true,
    })
}
