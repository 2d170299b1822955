//! Real Cappadocia locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. All of them fall inside the
//! regional elevation band used by the estimation model.

use tour_planner::Waypoint;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    /// Waypoint with a slug id derived from the name.
    pub fn waypoint(&self, category: &str) -> Waypoint {
        let id = self
            .name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        Waypoint::new(id, self.name, self.lat, self.lng).with_category(category)
    }
}

// ============================================================================
// Hotels (good for pinned start locations)
// ============================================================================

pub const HOTELS: &[Location] = &[
    Location::new("Museum Hotel Uchisar", 38.6308, 34.8041),
    Location::new("Argos in Cappadocia", 38.6265, 34.8019),
    Location::new("Kayakapi Premium Caves", 38.6281, 34.9107),
];

// ============================================================================
// Goreme town and open-air museum
// ============================================================================

pub const GOREME: &[Location] = &[
    Location::new("Goreme Open Air Museum", 38.6403, 34.8451),
    Location::new("Goreme Bus Station", 38.6431, 34.8290),
    Location::new("Sunset Point Goreme", 38.6420, 34.8238),
    Location::new("Aydinli Cave", 38.6446, 34.8250),
];

// ============================================================================
// Valleys and viewpoints
// ============================================================================

pub const VALLEYS: &[Location] = &[
    Location::new("Uchisar Castle", 38.6301, 34.8062),
    Location::new("Pigeon Valley", 38.6351, 34.8190),
    Location::new("Love Valley", 38.6620, 34.8175),
    Location::new("Pasabag Fairy Chimneys", 38.6730, 34.8610),
    Location::new("Devrent Valley", 38.6550, 34.8870),
    Location::new("Ortahisar Castle", 38.6263, 34.8595),
    Location::new("Zelve Open Air Museum", 38.6690, 34.8660),
    Location::new("Cavusin Old Village", 38.6715, 34.8385),
];

/// Hotel first, then a deliberately zig-zagging tour of sights.
pub fn zigzag_tour() -> Vec<Waypoint> {
    vec![
        HOTELS[0].waypoint("hotel").pinned_start(),
        VALLEYS[3].waypoint("sight"),
        VALLEYS[1].waypoint("viewpoint"),
        VALLEYS[6].waypoint("museum"),
        GOREME[0].waypoint("museum"),
        VALLEYS[2].waypoint("viewpoint"),
        VALLEYS[5].waypoint("sight"),
    ]
}

/// Fifteen distinct points for budget tests.
pub fn fifteen_points() -> Vec<Waypoint> {
    HOTELS
        .iter()
        .chain(GOREME)
        .chain(VALLEYS)
        .map(|location| location.waypoint("poi"))
        .collect()
}
