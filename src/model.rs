//! Plain data shapes exchanged between the planner core and its callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::polyline::Polyline;

/// A geographic point (POI or start location) participating in a route.
///
/// Identity is by `id`. A waypoint flagged as pinned start is never reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_pinned_start: bool,
}

impl Waypoint {
    pub fn new(id: impl Into<String>, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude,
            longitude,
            category: String::new(),
            is_pinned_start: false,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn pinned_start(mut self) -> Self {
        self.is_pinned_start = true;
        self
    }

    /// Location as (lat, lng).
    pub fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

/// Portion of a route between two consecutive waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSegment {
    pub from_waypoint_id: String,
    pub to_waypoint_id: String,
    pub coordinates: Polyline,
    pub distance_km: f64,
    /// True when the geometry is a straight chord rather than a walked path.
    pub is_fallback: bool,
}

/// Where an elevation value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationOrigin {
    Cached,
    Remote,
    Estimated,
}

/// One cached elevation lookup, keyed by coordinates rounded to 4 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationSample {
    pub lat_key: f64,
    pub lon_key: f64,
    pub elevation_meters: f64,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Cumulative great-circle distance from the first point.
    pub distance_km: f64,
    pub elevation_meters: f64,
    pub origin: ElevationOrigin,
}

/// Elevation along an ordered point list, with ascent/descent aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationProfile {
    pub points: Vec<ProfilePoint>,
    pub min_elevation: f64,
    pub max_elevation: f64,
    pub avg_elevation: f64,
    pub total_ascent: f64,
    pub total_descent: f64,
    pub elevation_gain: f64,
}

impl ElevationProfile {
    /// Number of points whose elevation came from the estimation model.
    pub fn estimated_points(&self) -> usize {
        self.points
            .iter()
            .filter(|point| point.origin == ElevationOrigin::Estimated)
            .count()
    }
}

/// Fully assembled route handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub ordered_waypoints: Vec<Waypoint>,
    pub segments: Vec<RouteSegment>,
    pub total_distance_km: f64,
    pub estimated_time_minutes: f64,
    pub elevation_profile: ElevationProfile,
    /// True iff any segment is a straight-line fallback.
    pub degraded: bool,
}

/// Summary figures for a route-statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatistics {
    pub waypoint_count: usize,
    pub total_distance_km: f64,
    pub estimated_time_minutes: f64,
    pub total_ascent: f64,
    pub total_descent: f64,
    pub degraded: bool,
}

/// Lifecycle of the plan owned by a session.
///
/// `Empty -> Pending -> Computing -> Ready | Degraded`, back to `Empty` on clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PlanState {
    #[default]
    Empty,
    Pending,
    Computing,
    Ready(RoutePlan),
    Degraded(RoutePlan),
}

impl PlanState {
    /// The usable plan, if one has been installed.
    pub fn plan(&self) -> Option<&RoutePlan> {
        match self {
            PlanState::Ready(plan) | PlanState::Degraded(plan) => Some(plan),
            _ => None,
        }
    }
}
