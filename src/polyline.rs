//! Polyline representation for route geometries.
//!
//! Segments carry decoded coordinate sequences. Whatever shape the routing
//! capability sends is normalized into this type at the provider boundary.

use serde::{Deserialize, Serialize};

use crate::haversine::distance_km;

/// A polyline representing a route geometry as decoded coordinates.
///
/// Each point is a (latitude, longitude) tuple.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline {
    points: Vec<(f64, f64)>,
}

impl Polyline {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    /// Two-point chord between `from` and `to`.
    pub fn chord(from: (f64, f64), to: (f64, f64)) -> Self {
        Self {
            points: vec![from, to],
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn into_points(self) -> Vec<(f64, f64)> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Great-circle length along every vertex, in kilometers.
    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| distance_km(pair[0], pair[1]))
            .sum()
    }

    /// Index of the vertex at or after `from` that lies closest to `target`.
    pub fn nearest_vertex_from(&self, from: usize, target: (f64, f64)) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .skip(from)
            .map(|(idx, point)| (idx, distance_km(*point, target)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }
}
