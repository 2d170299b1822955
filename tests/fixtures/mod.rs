//! Test fixtures for tour-planner.
//!
//! Provides:
//! - Real Cappadocia points of interest (from OpenStreetMap)
//! - Stub routing and elevation capabilities with call counters

#![allow(dead_code)]

pub mod cappadocia_locations;
pub mod stubs;

pub use cappadocia_locations::*;
pub use stubs::*;
