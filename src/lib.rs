//! tour-planner core
//!
//! Ordered walking routes over points of interest: waypoint ordering,
//! path geometry with straight-line degradation, elevation profiles under a
//! request budget, and debounced per-session recomputation.

pub mod assembler;
pub mod config;
pub mod elevation;
pub mod error;
pub mod geometry;
pub mod haversine;
pub mod model;
pub mod polyline;
pub mod routing;
pub mod schedule;
pub mod session;
pub mod solver;
pub mod store;
pub mod traits;

pub use assembler::{AssemblerOptions, RouteAssembler};
pub use config::PlannerConfig;
pub use elevation::{ElevationService, ElevationSettings, HttpElevationSource};
pub use error::{ElevationError, RoutingError, StoreError};
pub use geometry::{GeometryResolution, GeometryStrategy, RouteGeometryProvider};
pub use model::{ElevationProfile, PlanState, RoutePlan, RouteSegment, RouteStatistics, Waypoint};
pub use routing::{HttpRoutingClient, RoutingConfig};
pub use session::RouteSession;
pub use solver::{OptimizeResult, OptimizeStatus, SolveOptions, optimize};
pub use store::ElevationStore;
pub use traits::{ElevationSource, EstimateOnly, RoutingService};
