//! Planner configuration from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::assembler::AssemblerOptions;
use crate::elevation::{DEFAULT_CACHE_TTL, DEFAULT_REQUEST_BUDGET, ElevationSettings, ElevationSourceConfig};
use crate::routing::RoutingConfig;
use crate::session::DEFAULT_DEBOUNCE;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub routing: RoutingConfig,
    /// Empty endpoint means estimate-only elevation.
    pub elevation_source: ElevationSourceConfig,
    pub elevation: ElevationSettings,
    /// Optional on-disk elevation cache.
    pub elevation_cache: Option<PathBuf>,
    pub debounce: Duration,
    pub optimize: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unset or unparseable values
    /// take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |name: &str| lookup(name).and_then(|s| s.trim().parse::<u64>().ok());
        let routing_defaults = RoutingConfig::default();
        let source_defaults = ElevationSourceConfig::default();

        Self {
            routing: RoutingConfig {
                endpoint: lookup("TOUR_ROUTING_URL").unwrap_or(routing_defaults.endpoint),
                timeout_secs: parsed("TOUR_ROUTING_TIMEOUT_SECS").unwrap_or(routing_defaults.timeout_secs),
            },
            elevation_source: ElevationSourceConfig {
                endpoint: lookup("TOUR_ELEVATION_URL").unwrap_or_default(),
                timeout_secs: source_defaults.timeout_secs,
            },
            elevation: ElevationSettings {
                request_budget: lookup("TOUR_ELEVATION_BUDGET")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(DEFAULT_REQUEST_BUDGET),
                cache_ttl: parsed("TOUR_ELEVATION_TTL_SECS")
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_CACHE_TTL),
                ..ElevationSettings::default()
            },
            elevation_cache: lookup("TOUR_ELEVATION_CACHE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            debounce: parsed("TOUR_DEBOUNCE_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_DEBOUNCE),
            optimize: lookup("TOUR_OPTIMIZE")
                .map(|s| !matches!(s.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
        }
    }

    pub fn assembler_options(&self) -> AssemblerOptions {
        AssemblerOptions {
            optimize: self.optimize,
            ..AssemblerOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> PlannerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlannerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.routing.endpoint, "http://localhost:8000/api/route/walking");
        assert_eq!(config.routing.timeout_secs, 10);
        assert!(config.elevation_source.endpoint.is_empty());
        assert_eq!(config.elevation.request_budget, 10);
        assert_eq!(config.elevation.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.debounce, Duration::from_millis(1000));
        assert!(config.elevation_cache.is_none());
        assert!(config.optimize);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = config_from(&[
            ("TOUR_ROUTING_URL", "http://router.test/walk"),
            ("TOUR_ELEVATION_BUDGET", "3"),
            ("TOUR_ELEVATION_TTL_SECS", "soon"),
            ("TOUR_DEBOUNCE_MS", "250"),
            ("TOUR_ELEVATION_CACHE", "/tmp/elevation.json"),
            ("TOUR_OPTIMIZE", "off"),
        ]);

        assert_eq!(config.routing.endpoint, "http://router.test/walk");
        assert_eq!(config.elevation.request_budget, 3);
        assert_eq!(config.elevation.cache_ttl, DEFAULT_CACHE_TTL);
        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.elevation_cache, Some(PathBuf::from("/tmp/elevation.json")));
        assert!(!config.assembler_options().optimize);
    }
}
