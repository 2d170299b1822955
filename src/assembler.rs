//! Route assembly: optimize, resolve geometry, profile elevation, merge.

use tracing::debug;

use crate::elevation::ElevationService;
use crate::geometry::RouteGeometryProvider;
use crate::model::{RoutePlan, RouteStatistics, Waypoint};
use crate::session::RouteSession;
use crate::solver::{SolveOptions, optimize};
use crate::traits::{ElevationSource, RoutingService};

/// Walking pace applied when every segment is a straight-line fallback.
pub const FALLBACK_MINUTES_PER_KM: f64 = 12.0;

/// Multiplier used for route-statistics reporting. It is not a walking pace:
/// it folds an assumed per-stop visit time into each kilometer.
///
/// Kept separate from [`FALLBACK_MINUTES_PER_KM`] on purpose; the two figures
/// have always been reported independently.
pub const ROUTE_STATISTICS_MINUTES_PER_KM: f64 = 45.0;

/// Which time figure is being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaceContext {
    FallbackOnly,
    RouteStatistics,
}

impl PaceContext {
    pub fn minutes_per_km(self) -> f64 {
        match self {
            PaceContext::FallbackOnly => FALLBACK_MINUTES_PER_KM,
            PaceContext::RouteStatistics => ROUTE_STATISTICS_MINUTES_PER_KM,
        }
    }

    /// Whole minutes for `distance_km` at this pace.
    pub fn minutes_for(self, distance_km: f64) -> f64 {
        (distance_km * self.minutes_per_km()).round()
    }
}

impl RoutePlan {
    /// Figures for a route-statistics panel, always at the statistics pace.
    pub fn statistics(&self) -> RouteStatistics {
        RouteStatistics {
            waypoint_count: self.ordered_waypoints.len(),
            total_distance_km: self.total_distance_km,
            estimated_time_minutes: PaceContext::RouteStatistics.minutes_for(self.total_distance_km),
            total_ascent: self.elevation_profile.total_ascent,
            total_descent: self.elevation_profile.total_descent,
            degraded: self.degraded,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Run the waypoint optimizer before resolving geometry.
    pub optimize: bool,
    pub solve: SolveOptions,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            optimize: true,
            solve: SolveOptions::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteAssembler<R> {
    geometry: RouteGeometryProvider<R>,
    options: AssemblerOptions,
}

impl<R: RoutingService> RouteAssembler<R> {
    pub fn new(geometry: RouteGeometryProvider<R>, options: AssemblerOptions) -> Self {
        Self { geometry, options }
    }

    pub fn options(&self) -> &AssemblerOptions {
        &self.options
    }

    /// Recompute and install the session's plan from its current waypoints.
    pub async fn recompute<S: ElevationSource>(&self, session: &mut RouteSession<S>) -> RoutePlan {
        let ticket = session.begin_recompute();
        let plan = self.assemble(ticket.waypoints, session.elevation_mut()).await;
        session.finish_recompute(ticket.token, plan.clone());
        plan
    }

    /// Wait for the session's debounce window to elapse, then recompute.
    /// Returns `None` when no mutation is pending.
    pub async fn run_scheduled<S: ElevationSource>(&self, session: &mut RouteSession<S>) -> Option<RoutePlan> {
        if !session.recompute_due().await {
            return None;
        }
        Some(self.recompute(session).await)
    }

    /// Build a plan for `waypoints` without touching session state beyond
    /// the elevation cache and budget.
    pub async fn assemble<S: ElevationSource>(
        &self,
        waypoints: Vec<Waypoint>,
        elevation: &mut ElevationService<S>,
    ) -> RoutePlan {
        let ordered = if self.options.optimize {
            let result = optimize(&waypoints, None, &self.options.solve);
            debug!(
                status = ?result.status,
                before_km = result.distance_before_km,
                after_km = result.distance_after_km,
                "waypoints optimized"
            );
            result.waypoints
        } else {
            waypoints
        };

        let geometry = self.geometry.resolve(&ordered).await;
        let elevation_profile = elevation.profile(&ordered).await;

        let pace = if geometry.is_fallback_only() {
            PaceContext::FallbackOnly
        } else {
            PaceContext::RouteStatistics
        };
        let degraded = geometry.has_fallback();

        RoutePlan {
            ordered_waypoints: ordered,
            estimated_time_minutes: pace.minutes_for(geometry.total_distance_km),
            total_distance_km: geometry.total_distance_km,
            segments: geometry.segments,
            elevation_profile,
            degraded,
        }
    }
}
