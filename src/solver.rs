//! Waypoint order optimizer (bounded first-improvement 2-opt).

use rayon::prelude::*;
use tracing::debug;

use crate::haversine::distance_km;
use crate::model::Waypoint;

/// Fewest reorderable waypoints for which 2-opt can change anything.
const MIN_REORDERABLE: usize = 3;

/// Gains below this are float noise, not shorter tours.
const IMPROVEMENT_EPSILON_KM: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Maximum full scans of the candidate pairs before giving up.
    pub max_passes: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { max_passes: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeStatus {
    /// Local search ran (it may still have found nothing to improve).
    Applied,
    /// Fewer than three reorderable waypoints; order returned unchanged.
    NotApplicable,
}

#[derive(Debug, Clone)]
pub struct OptimizeResult {
    pub waypoints: Vec<Waypoint>,
    pub distance_before_km: f64,
    pub distance_after_km: f64,
    pub passes: usize,
    pub status: OptimizeStatus,
}

impl OptimizeResult {
    pub fn improved(&self) -> bool {
        self.distance_after_km < self.distance_before_km
    }
}

/// Reorder `waypoints` to shorten the open path through them.
///
/// The pinned start is `pinned_start` when given, otherwise the first waypoint
/// flagged `is_pinned_start`. It is always moved to the front, even when the
/// search itself is not applicable, and never moves after that. Only the
/// remaining suffix is searched.
pub fn optimize(
    waypoints: &[Waypoint],
    pinned_start: Option<&Waypoint>,
    options: &SolveOptions,
) -> OptimizeResult {
    let (mut tour, first_free) = arrange_tour(waypoints, pinned_start);
    let reorderable = tour.len() - first_free;

    let matrix = distance_matrix(&tour);
    let mut order: Vec<usize> = (0..tour.len()).collect();
    let distance_before_km = tour_length(&order, &matrix);

    if reorderable < MIN_REORDERABLE {
        debug!(reorderable, "optimizer not applicable");
        return OptimizeResult {
            waypoints: tour,
            distance_before_km,
            distance_after_km: distance_before_km,
            passes: 0,
            status: OptimizeStatus::NotApplicable,
        };
    }

    let mut current_km = distance_before_km;
    let mut passes = 0;
    while passes < options.max_passes {
        passes += 1;
        match two_opt_improve(&mut order, first_free, current_km, &matrix) {
            Some(shorter_km) => current_km = shorter_km,
            None => break,
        }
    }

    debug!(
        passes,
        before_km = distance_before_km,
        after_km = current_km,
        "2-opt finished"
    );

    let mut slots: Vec<Option<Waypoint>> = tour.drain(..).map(Some).collect();
    let waypoints = order
        .iter()
        .filter_map(|&idx| slots[idx].take())
        .collect();

    OptimizeResult {
        waypoints,
        distance_before_km,
        distance_after_km: current_km,
        passes,
        status: OptimizeStatus::Applied,
    }
}

/// Put the pinned start (if any) in front and return the first free index.
fn arrange_tour(waypoints: &[Waypoint], pinned_start: Option<&Waypoint>) -> (Vec<Waypoint>, usize) {
    let pinned = pinned_start
        .cloned()
        .or_else(|| waypoints.iter().find(|w| w.is_pinned_start).cloned());

    match pinned {
        Some(start) => {
            let mut tour = Vec::with_capacity(waypoints.len() + 1);
            tour.extend(
                waypoints
                    .iter()
                    .filter(|w| w.id != start.id)
                    .cloned(),
            );
            tour.insert(0, start);
            (tour, 1)
        }
        None => (waypoints.to_vec(), 0),
    }
}

/// 2-opt: scan pairs (i, j) in ascending order and apply the first reversal
/// of `order[i..=j]` that strictly shortens the path.
///
/// Adjacent pairs (`j == i + 1`) are skipped, so plain neighbour swaps are
/// never tried. Returns the new length if an improvement was made.
fn two_opt_improve(
    order: &mut [usize],
    first_free: usize,
    current_km: f64,
    matrix: &[Vec<f64>],
) -> Option<f64> {
    let n = order.len();

    for i in first_free..n {
        for j in i + 2..n {
            order[i..=j].reverse();
            let candidate_km = tour_length(order, matrix);
            if candidate_km + IMPROVEMENT_EPSILON_KM < current_km {
                return Some(candidate_km);
            }
            order[i..=j].reverse();
        }
    }

    None
}

fn tour_length(order: &[usize], matrix: &[Vec<f64>]) -> f64 {
    order.windows(2).map(|pair| matrix[pair[0]][pair[1]]).sum()
}

fn distance_matrix(tour: &[Waypoint]) -> Vec<Vec<f64>> {
    tour.par_iter()
        .map(|from| {
            tour.iter()
                .map(|to| distance_km(from.location(), to.location()))
                .collect()
        })
        .collect()
}
