//! Route geometry resolution with automatic degradation.
//!
//! The provider asks the walking-path capability first. Any failure (transport,
//! malformed payload, explicit rejection, wrong segment count) is swallowed
//! into a straight-line result; the reason is kept on the resolution so callers
//! and tests can observe that a fallback happened.

use tracing::warn;

use crate::error::RoutingError;
use crate::haversine::StraightLine;
use crate::model::{RouteSegment, Waypoint};
use crate::traits::RoutingService;

/// Which strategy produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryStrategy {
    NetworkRouted,
    StraightLineFallback,
}

#[derive(Debug, Clone)]
pub struct GeometryResolution {
    pub segments: Vec<RouteSegment>,
    pub total_distance_km: f64,
    pub strategy: GeometryStrategy,
    /// Set when the network strategy was attempted and abandoned.
    pub fallback_reason: Option<RoutingError>,
}

impl GeometryResolution {
    fn new(segments: Vec<RouteSegment>, strategy: GeometryStrategy, fallback_reason: Option<RoutingError>) -> Self {
        let total_distance_km = segments.iter().map(|segment| segment.distance_km).sum();
        Self {
            segments,
            total_distance_km,
            strategy,
            fallback_reason,
        }
    }

    /// True when at least one segment is a straight-line substitute.
    pub fn has_fallback(&self) -> bool {
        self.segments.iter().any(|segment| segment.is_fallback)
    }

    /// True when every segment is a straight-line substitute.
    pub fn is_fallback_only(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(|segment| segment.is_fallback)
    }
}

/// Turns an ordered waypoint list into path segments.
///
/// With no routing service configured it always resolves straight lines.
#[derive(Debug, Clone)]
pub struct RouteGeometryProvider<R> {
    routing: Option<R>,
    straight_line: StraightLine,
}

impl<R: RoutingService> RouteGeometryProvider<R> {
    pub fn network(routing: R) -> Self {
        Self {
            routing: Some(routing),
            straight_line: StraightLine,
        }
    }

    pub fn straight_line_only() -> Self {
        Self {
            routing: None,
            straight_line: StraightLine,
        }
    }

    pub fn routing(&self) -> Option<&R> {
        self.routing.as_ref()
    }

    /// Resolve exactly `waypoints.len() - 1` segments (none for fewer than two
    /// waypoints). Never fails and never mutates the input.
    pub async fn resolve(&self, waypoints: &[Waypoint]) -> GeometryResolution {
        if waypoints.len() < 2 {
            return GeometryResolution::new(Vec::new(), GeometryStrategy::StraightLineFallback, None);
        }

        let Some(routing) = &self.routing else {
            return self.fallback(waypoints, None);
        };

        let expected = waypoints.len() - 1;
        match routing.route(waypoints).await {
            Ok(segments) if segments.len() == expected => {
                GeometryResolution::new(segments, GeometryStrategy::NetworkRouted, None)
            }
            Ok(segments) => {
                let reason = RoutingError::Format(format!(
                    "expected {} segments, got {}",
                    expected,
                    segments.len()
                ));
                warn!(%reason, "routing returned unusable geometry, using straight lines");
                self.fallback(waypoints, Some(reason))
            }
            Err(reason) => {
                warn!(%reason, "routing failed, using straight lines");
                self.fallback(waypoints, Some(reason))
            }
        }
    }

    fn fallback(&self, waypoints: &[Waypoint], reason: Option<RoutingError>) -> GeometryResolution {
        GeometryResolution::new(
            self.straight_line.segments(waypoints),
            GeometryStrategy::StraightLineFallback,
            reason,
        )
    }
}
