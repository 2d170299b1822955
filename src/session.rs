//! Per-user planning session.
//!
//! A session owns everything that used to be ambient state: the waypoint list,
//! the elevation cache and request budget, the pending debounced recompute,
//! and the token that orders recompute results.

use std::time::Duration;

use tracing::{debug, info};

use crate::elevation::ElevationService;
use crate::model::{PlanState, RoutePlan, Waypoint};
use crate::schedule::Debouncer;
use crate::traits::{ElevationSource, EstimateOnly};

/// Default quiet period before a mutation triggers a recompute.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Snapshot handed out when a recompute starts.
#[derive(Debug, Clone)]
pub struct RecomputeTicket {
    pub token: u64,
    pub waypoints: Vec<Waypoint>,
}

#[derive(Debug)]
pub struct RouteSession<S = EstimateOnly> {
    waypoints: Vec<Waypoint>,
    elevation: ElevationService<S>,
    debouncer: Debouncer,
    state: PlanState,
    /// Bumped on every waypoint mutation; tags debounce firings.
    revision: u64,
    /// Latest recompute token issued; only its result may be installed.
    latest_token: u64,
    completed_recomputes: usize,
}

impl Default for RouteSession<EstimateOnly> {
    fn default() -> Self {
        Self::new(ElevationService::default(), DEFAULT_DEBOUNCE)
    }
}

impl<S: ElevationSource> RouteSession<S> {
    pub fn new(elevation: ElevationService<S>, debounce: Duration) -> Self {
        Self {
            waypoints: Vec::new(),
            elevation,
            debouncer: Debouncer::new(debounce),
            state: PlanState::Empty,
            revision: 0,
            latest_token: 0,
            completed_recomputes: 0,
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn state(&self) -> &PlanState {
        &self.state
    }

    pub fn plan(&self) -> Option<&RoutePlan> {
        self.state.plan()
    }

    pub fn elevation(&self) -> &ElevationService<S> {
        &self.elevation
    }

    pub fn elevation_mut(&mut self) -> &mut ElevationService<S> {
        &mut self.elevation
    }

    /// Plans installed so far.
    pub fn completed_recomputes(&self) -> usize {
        self.completed_recomputes
    }

    pub fn has_pending_recompute(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Add a waypoint, replacing any existing one with the same id.
    /// A pinned-start waypoint goes to the front and unpins the previous start.
    pub fn add_waypoint(&mut self, waypoint: Waypoint) {
        let pinned = waypoint.is_pinned_start;
        match self.waypoints.iter_mut().find(|w| w.id == waypoint.id) {
            Some(existing) => *existing = waypoint.clone(),
            None => self.waypoints.push(waypoint.clone()),
        }
        if pinned {
            self.pin(&waypoint.id);
        }
        self.mutated();
    }

    pub fn remove_waypoint(&mut self, id: &str) -> Option<Waypoint> {
        let index = self.waypoints.iter().position(|w| w.id == id)?;
        let removed = self.waypoints.remove(index);
        self.mutated();
        Some(removed)
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<Waypoint>) {
        self.waypoints = waypoints;
        if let Some(id) = self.waypoints.iter().find(|w| w.is_pinned_start).map(|w| w.id.clone()) {
            self.pin(&id);
        }
        self.mutated();
    }

    /// Pin an existing waypoint as the start. Returns false for unknown ids.
    pub fn set_pinned_start(&mut self, id: &str) -> bool {
        if !self.waypoints.iter().any(|w| w.id == id) {
            return false;
        }
        self.pin(id);
        self.mutated();
        true
    }

    /// Drop every waypoint and the current plan, cancelling pending work.
    /// Any recompute still in flight becomes stale.
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.debouncer.cancel();
        self.revision += 1;
        self.latest_token += 1;
        self.state = PlanState::Empty;
    }

    /// Start a recompute over the current waypoints. A pending debounced
    /// recompute is dropped since this one already covers it.
    pub fn begin_recompute(&mut self) -> RecomputeTicket {
        self.debouncer.cancel();
        self.latest_token += 1;
        self.state = PlanState::Computing;
        RecomputeTicket {
            token: self.latest_token,
            waypoints: self.waypoints.clone(),
        }
    }

    /// Install `plan` if `token` is still the latest one issued.
    /// Results of superseded recomputes are discarded.
    pub fn finish_recompute(&mut self, token: u64, plan: RoutePlan) -> bool {
        if token != self.latest_token {
            debug!(token, latest = self.latest_token, "discarding stale route plan");
            return false;
        }
        info!(
            waypoints = plan.ordered_waypoints.len(),
            distance_km = plan.total_distance_km,
            degraded = plan.degraded,
            "route plan ready"
        );
        self.state = if plan.degraded {
            PlanState::Degraded(plan)
        } else {
            PlanState::Ready(plan)
        };
        self.completed_recomputes += 1;
        true
    }

    /// Wait until the debounce window for the latest mutation elapses.
    /// Returns false when no recompute is scheduled.
    pub async fn recompute_due(&mut self) -> bool {
        while let Some(revision) = self.debouncer.fired().await {
            if revision == self.revision {
                return true;
            }
            debug!(revision, latest = self.revision, "ignoring superseded debounce firing");
        }
        false
    }

    fn pin(&mut self, id: &str) {
        for waypoint in &mut self.waypoints {
            waypoint.is_pinned_start = waypoint.id == id;
        }
        if let Some(index) = self.waypoints.iter().position(|w| w.id == id) {
            let start = self.waypoints.remove(index);
            self.waypoints.insert(0, start);
        }
    }

    fn mutated(&mut self) {
        self.revision += 1;
        self.debouncer.schedule(self.revision);
        self.state = PlanState::Pending;
    }
}
