//! Stub capabilities for exercising the planner without a network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tour_planner::haversine::distance_km;
use tour_planner::polyline::Polyline;
use tour_planner::{ElevationError, ElevationSource, RouteSegment, RoutingError, RoutingService, Waypoint};

/// How the stub routing capability answers.
#[derive(Debug, Clone)]
pub enum RoutingBehavior {
    /// One walked segment per pair, 30% longer than the chord.
    Routed,
    /// One segment fewer than requested.
    DropLastSegment,
    /// Walked segments, but the last one flagged as a server-side fallback.
    PartialFallback,
    Fail(RoutingError),
}

#[derive(Debug, Clone)]
pub struct StubRouting {
    behavior: RoutingBehavior,
    calls: Arc<AtomicUsize>,
}

impl StubRouting {
    pub fn new(behavior: RoutingBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn walked(waypoints: &[Waypoint]) -> Vec<RouteSegment> {
        waypoints
            .windows(2)
            .map(|pair| {
                let (from, to) = (pair[0].location(), pair[1].location());
                let bend = ((from.0 + to.0) / 2.0 + 0.001, (from.1 + to.1) / 2.0);
                RouteSegment {
                    from_waypoint_id: pair[0].id.clone(),
                    to_waypoint_id: pair[1].id.clone(),
                    coordinates: Polyline::new(vec![from, bend, to]),
                    distance_km: distance_km(from, to) * 1.3,
                    is_fallback: false,
                }
            })
            .collect()
    }
}

impl RoutingService for StubRouting {
    async fn route(&self, waypoints: &[Waypoint]) -> Result<Vec<RouteSegment>, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            RoutingBehavior::Routed => Ok(Self::walked(waypoints)),
            RoutingBehavior::DropLastSegment => {
                let mut segments = Self::walked(waypoints);
                segments.pop();
                Ok(segments)
            }
            RoutingBehavior::PartialFallback => {
                let mut segments = Self::walked(waypoints);
                if let Some(last) = segments.last_mut() {
                    last.is_fallback = true;
                }
                Ok(segments)
            }
            RoutingBehavior::Fail(err) => Err(err.clone()),
        }
    }
}

/// Elevation source that answers a fixed value (or fails) and counts calls.
#[derive(Debug, Clone)]
pub struct CountingElevation {
    elevation_m: Option<f64>,
    calls: Arc<AtomicUsize>,
}

impl CountingElevation {
    pub fn answering(elevation_m: f64) -> Self {
        Self {
            elevation_m: Some(elevation_m),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            elevation_m: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ElevationSource for CountingElevation {
    async fn elevation(&self, _lat: f64, _lon: f64) -> Result<f64, ElevationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.elevation_m
            .ok_or_else(|| ElevationError::Transport("connection refused".to_string()))
    }
}
