//! Great-circle geometry and the straight-line route strategy.
//!
//! The straight-line strategy is the fallback when walking-path routing is
//! unavailable: less accurate (ignores paths) but always available.

use crate::model::{RouteSegment, Waypoint};
use crate::polyline::Polyline;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two (lat, lng) points in kilometers.
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lng1) = from;
    let (lat2, lng2) = to;

    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Total distance visiting `waypoints` in order.
pub fn path_length_km(waypoints: &[Waypoint]) -> f64 {
    waypoints
        .windows(2)
        .map(|pair| distance_km(pair[0].location(), pair[1].location()))
        .sum()
}

/// Direct geodesic chords between consecutive waypoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLine;

impl StraightLine {
    /// One two-point fallback segment per consecutive waypoint pair.
    pub fn segments(&self, waypoints: &[Waypoint]) -> Vec<RouteSegment> {
        waypoints
            .windows(2)
            .map(|pair| {
                let (from, to) = (&pair[0], &pair[1]);
                RouteSegment {
                    from_waypoint_id: from.id.clone(),
                    to_waypoint_id: to.id.clone(),
                    coordinates: Polyline::chord(from.location(), to.location()),
                    distance_km: distance_km(from.location(), to.location()),
                    is_fallback: true,
                }
            })
            .collect()
    }
}
