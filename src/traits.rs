//! Seams to the external capabilities the planner core depends on.
//!
//! These are intentionally minimal. The HTTP implementations live in
//! [`crate::routing`] and [`crate::elevation`]; tests substitute their own.

use std::future::{self, Future};

use crate::error::{ElevationError, RoutingError};
use crate::model::{RouteSegment, Waypoint};

/// Walking-path routing capability.
///
/// Implementations return exactly the decoded segments the capability
/// produced; segment-count validation and fallback are the caller's job.
pub trait RoutingService {
    fn route(
        &self,
        waypoints: &[Waypoint],
    ) -> impl Future<Output = Result<Vec<RouteSegment>, RoutingError>>;
}

/// Per-point elevation capability.
pub trait ElevationSource {
    /// Disabled sources are never called; lookups fall through to estimation.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Elevation in meters at (lat, lon).
    fn elevation(&self, lat: f64, lon: f64) -> impl Future<Output = Result<f64, ElevationError>>;
}

/// Policy source that never reaches the network: every lookup is estimated.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimateOnly;

impl ElevationSource for EstimateOnly {
    fn is_enabled(&self) -> bool {
        false
    }

    fn elevation(&self, _lat: f64, _lon: f64) -> impl Future<Output = Result<f64, ElevationError>> {
        future::ready(Err(ElevationError::Transport(
            "elevation lookups are disabled".to_string(),
        )))
    }
}
