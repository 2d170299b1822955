//! Elevation lookups and route elevation profiles.
//!
//! Lookups go through three layers, in order:
//!
//! 1. the session request budget: once spent, every call is estimated and
//!    nothing is read, written or fetched;
//! 2. a TTL cache keyed by coordinates rounded to 4 decimals (~11 m), with
//!    lazy eviction of expired entries on read;
//! 3. the configured [`ElevationSource`], or the estimation model when the
//!    source is disabled or fails.
//!
//! Cache writes are mirrored to an optional [`ElevationStore`] so entries
//! outlive the process.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ElevationError;
use crate::haversine::distance_km;
use crate::model::{ElevationOrigin, ElevationProfile, ElevationSample, ProfilePoint, Waypoint};
use crate::store::{ElevationStore, StoredElevation, StoredEntries};
use crate::traits::{ElevationSource, EstimateOnly};

/// External lookups allowed per session.
pub const DEFAULT_REQUEST_BUDGET: u32 = 10;

/// Cached elevations older than this are treated as absent.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

const KEY_PREFIX: &str = "elevation_";

/// Cache key for a coordinate, rounded to 4 decimal places.
pub fn cache_key(lat: f64, lon: f64) -> String {
    format!("{}{:.4}_{:.4}", KEY_PREFIX, lat, lon)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn parse_key(key: &str) -> Option<(f64, f64)> {
    let (lat, lon) = key.strip_prefix(KEY_PREFIX)?.split_once('_')?;
    Some((lat.parse().ok()?, lon.parse().ok()?))
}

/// Deterministic regional elevation estimate.
///
/// `clamp(round(base + Δlat·lat_gradient + Δlon·lon_gradient + jitter), min, max)`
/// where the jitter is drawn from a ChaCha8 stream seeded by the rounded
/// coordinate, so one location always estimates to the same value, across
/// releases of the RNG crates too.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationModel {
    pub base_m: f64,
    pub reference_lat: f64,
    pub reference_lon: f64,
    /// Meters per degree of latitude away from the reference.
    pub lat_gradient_m: f64,
    /// Meters per degree of longitude away from the reference.
    pub lon_gradient_m: f64,
    /// Jitter is drawn from `[-jitter_m, +jitter_m]`.
    pub jitter_m: f64,
    pub min_m: f64,
    pub max_m: f64,
}

impl Default for EstimationModel {
    fn default() -> Self {
        Self {
            base_m: 1100.0,
            reference_lat: 38.6,
            reference_lon: 34.8,
            lat_gradient_m: 500.0,
            lon_gradient_m: 300.0,
            jitter_m: 50.0,
            min_m: 900.0,
            max_m: 1500.0,
        }
    }
}

impl EstimationModel {
    pub fn estimate(&self, lat: f64, lon: f64) -> f64 {
        let (lat, lon) = (round4(lat), round4(lon));
        let spread = self.jitter_m.abs();
        let jitter = if spread > 0.0 {
            let mut rng = ChaCha8Rng::seed_from_u64(fnv1a(cache_key(lat, lon).as_bytes()));
            rng.random_range(-spread..=spread)
        } else {
            0.0
        };

        let raw = self.base_m
            + (lat - self.reference_lat) * self.lat_gradient_m
            + (lon - self.reference_lon) * self.lon_gradient_m
            + jitter;

        let estimate = raw.round().clamp(self.min_m, self.max_m);
        if estimate.is_finite() { estimate } else { self.base_m.clamp(self.min_m, self.max_m) }
    }

    pub fn contains(&self, elevation_m: f64) -> bool {
        (self.min_m..=self.max_m).contains(&elevation_m)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Session-wide cap on external elevation lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestBudget {
    cap: u32,
    used: u32,
}

impl RequestBudget {
    pub fn new(cap: u32) -> Self {
        Self { cap, used: 0 }
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.cap.saturating_sub(self.used)
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.cap
    }

    /// Take one unit; false if none are left.
    pub fn try_consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }
}

/// In-memory elevation cache with lazy TTL eviction.
#[derive(Debug, Clone)]
pub struct ElevationCache {
    entries: HashMap<String, ElevationSample>,
    ttl: chrono::Duration,
}

impl ElevationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Fresh elevation for `key`. An expired entry is removed and reported absent.
    pub fn get(&mut self, key: &str, now: DateTime<Utc>) -> Option<f64> {
        let sample = self.entries.get(key)?;
        if now.signed_duration_since(sample.cached_at) > self.ttl {
            debug!(key, "elevation cache entry expired");
            self.entries.remove(key);
            return None;
        }
        Some(sample.elevation_meters)
    }

    pub fn insert(&mut self, key: String, sample: ElevationSample) {
        self.entries.insert(key, sample);
    }

    /// Seed from persisted entries. Unparseable keys are skipped.
    pub fn extend_from_store(&mut self, stored: StoredEntries) {
        for (key, value) in stored {
            let Some((lat_key, lon_key)) = parse_key(&key) else {
                warn!(key = %key, "skipping unrecognised elevation cache key");
                continue;
            };
            self.entries.insert(
                key,
                ElevationSample {
                    lat_key,
                    lon_key,
                    elevation_meters: value.elevation,
                    cached_at: value.cached_at,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ElevationSettings {
    pub request_budget: u32,
    pub cache_ttl: Duration,
    pub model: EstimationModel,
}

impl Default for ElevationSettings {
    fn default() -> Self {
        Self {
            request_budget: DEFAULT_REQUEST_BUDGET,
            cache_ttl: DEFAULT_CACHE_TTL,
            model: EstimationModel::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationReading {
    pub elevation_m: f64,
    pub origin: ElevationOrigin,
}

/// Per-point elevation with caching, a request budget and estimation fallback.
#[derive(Debug)]
pub struct ElevationService<S = EstimateOnly> {
    source: S,
    cache: ElevationCache,
    budget: RequestBudget,
    model: EstimationModel,
    store: Option<ElevationStore>,
    external_calls: u32,
}

impl Default for ElevationService<EstimateOnly> {
    fn default() -> Self {
        Self::new(EstimateOnly, ElevationSettings::default())
    }
}

impl<S: ElevationSource> ElevationService<S> {
    pub fn new(source: S, settings: ElevationSettings) -> Self {
        Self {
            source,
            cache: ElevationCache::new(settings.cache_ttl),
            budget: RequestBudget::new(settings.request_budget),
            model: settings.model,
            store: None,
            external_calls: 0,
        }
    }

    /// Attach durable storage, seeding the cache from whatever it holds.
    /// A store that cannot be read starts empty rather than failing.
    pub fn with_store(mut self, store: ElevationStore) -> Self {
        match store.load() {
            Ok(entries) => {
                debug!(entries = entries.len(), path = %store.path().display(), "loaded elevation cache");
                self.cache.extend_from_store(entries);
            }
            Err(err) => warn!(%err, path = %store.path().display(), "ignoring unreadable elevation cache"),
        }
        self.store = Some(store);
        self
    }

    pub fn budget(&self) -> &RequestBudget {
        &self.budget
    }

    pub fn cache(&self) -> &ElevationCache {
        &self.cache
    }

    pub fn model(&self) -> &EstimationModel {
        &self.model
    }

    /// Calls actually made to the source.
    pub fn external_calls(&self) -> u32 {
        self.external_calls
    }

    pub async fn elevation_at(&mut self, lat: f64, lon: f64) -> f64 {
        self.lookup(lat, lon).await.elevation_m
    }

    pub async fn lookup(&mut self, lat: f64, lon: f64) -> ElevationReading {
        self.lookup_at(lat, lon, Utc::now()).await
    }

    /// Lookup with an explicit clock reading for cache freshness.
    pub async fn lookup_at(&mut self, lat: f64, lon: f64, now: DateTime<Utc>) -> ElevationReading {
        if self.budget.is_exhausted() {
            debug!(lat, lon, "elevation budget exhausted, estimating");
            return self.estimated(lat, lon);
        }

        let key = cache_key(lat, lon);
        if let Some(elevation_m) = self.cache.get(&key, now) {
            debug!(key = %key, "elevation cache hit");
            return ElevationReading {
                elevation_m,
                origin: ElevationOrigin::Cached,
            };
        }

        // Freshness check and budget charge happen before the only await.
        self.budget.try_consume();

        if !self.source.is_enabled() {
            let reading = self.estimated(lat, lon);
            self.remember(key, lat, lon, reading.elevation_m, now);
            return reading;
        }

        self.external_calls += 1;
        match self.source.elevation(lat, lon).await {
            Ok(elevation_m) if elevation_m.is_finite() => {
                self.remember(key, lat, lon, elevation_m, now);
                ElevationReading {
                    elevation_m,
                    origin: ElevationOrigin::Remote,
                }
            }
            Ok(elevation_m) => {
                warn!(lat, lon, elevation_m, "elevation source returned a non-finite value, estimating");
                self.estimated(lat, lon)
            }
            Err(err) => {
                warn!(%err, lat, lon, "elevation lookup failed, estimating");
                self.estimated(lat, lon)
            }
        }
    }

    /// Elevation along `waypoints` in order, with distance accumulated by
    /// great-circle legs.
    pub async fn profile(&mut self, waypoints: &[Waypoint]) -> ElevationProfile {
        let mut points = Vec::with_capacity(waypoints.len());
        let mut distance_km_so_far = 0.0;
        let mut previous: Option<(f64, f64)> = None;

        for waypoint in waypoints {
            let location = waypoint.location();
            if let Some(prev) = previous {
                distance_km_so_far += distance_km(prev, location);
            }
            let reading = self.lookup(waypoint.latitude, waypoint.longitude).await;
            points.push(ProfilePoint {
                latitude: waypoint.latitude,
                longitude: waypoint.longitude,
                distance_km: distance_km_so_far,
                elevation_meters: reading.elevation_m,
                origin: reading.origin,
            });
            previous = Some(location);
        }

        summarize(points)
    }

    fn estimated(&self, lat: f64, lon: f64) -> ElevationReading {
        ElevationReading {
            elevation_m: self.model.estimate(lat, lon),
            origin: ElevationOrigin::Estimated,
        }
    }

    fn remember(&mut self, key: String, lat: f64, lon: f64, elevation_m: f64, now: DateTime<Utc>) {
        if let Some(store) = &self.store {
            let stored = StoredElevation {
                elevation: elevation_m,
                cached_at: now,
            };
            if let Err(err) = store.put(&key, stored) {
                warn!(%err, key = %key, "failed to persist elevation");
            }
        }
        self.cache.insert(
            key,
            ElevationSample {
                lat_key: round4(lat),
                lon_key: round4(lon),
                elevation_meters: elevation_m,
                cached_at: now,
            },
        );
    }
}

/// Fold profile points into min/max/avg and ascent/descent totals.
pub fn summarize(points: Vec<ProfilePoint>) -> ElevationProfile {
    if points.is_empty() {
        return ElevationProfile::default();
    }

    let mut min_elevation = f64::INFINITY;
    let mut max_elevation = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for point in &points {
        min_elevation = min_elevation.min(point.elevation_meters);
        max_elevation = max_elevation.max(point.elevation_meters);
        sum += point.elevation_meters;
    }

    let mut total_ascent = 0.0;
    let mut total_descent = 0.0;
    for pair in points.windows(2) {
        let delta = pair[1].elevation_meters - pair[0].elevation_meters;
        if delta > 0.0 {
            total_ascent += delta;
        } else {
            total_descent += -delta;
        }
    }

    let avg_elevation = sum / points.len() as f64;
    ElevationProfile {
        points,
        min_elevation,
        max_elevation,
        avg_elevation,
        total_ascent,
        total_descent,
        elevation_gain: max_elevation - min_elevation,
    }
}

#[derive(Debug, Clone)]
pub struct ElevationSourceConfig {
    /// Endpoint accepting `latitude`/`longitude` query parameters.
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ElevationSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.open-meteo.com/v1/elevation".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Elevation capability over HTTP (Open-Meteo style response).
#[derive(Debug, Clone)]
pub struct HttpElevationSource {
    config: ElevationSourceConfig,
    client: reqwest::Client,
}

impl HttpElevationSource {
    pub fn new(config: ElevationSourceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, client })
    }

    fn url(&self, lat: f64, lon: f64) -> String {
        let separator = if self.config.endpoint.contains('?') { "&" } else { "?" };
        format!(
            "{}{}latitude={:.6}&longitude={:.6}",
            self.config.endpoint, separator, lat, lon
        )
    }
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    elevation: Option<Vec<f64>>,
}

impl ElevationSource for HttpElevationSource {
    fn is_enabled(&self) -> bool {
        !self.config.endpoint.trim().is_empty()
    }

    async fn elevation(&self, lat: f64, lon: f64) -> Result<f64, ElevationError> {
        let payload: ElevationResponse = self
            .client
            .get(self.url(lat, lon))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        payload
            .elevation
            .and_then(|values| values.first().copied())
            .ok_or_else(|| ElevationError::Format("response has no elevation".to_string()))
    }
}
