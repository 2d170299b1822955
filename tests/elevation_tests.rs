//! Elevation service tests
//!
//! Request budget, cache behavior, estimation fallback and persistence.

mod fixtures;

use std::time::Duration;

use chrono::{TimeZone, Utc};
use fixtures::*;
use tour_planner::elevation::{ElevationSettings, EstimationModel};
use tour_planner::model::ElevationOrigin;
use tour_planner::{ElevationService, ElevationStore, EstimateOnly};

fn settings(request_budget: u32) -> ElevationSettings {
    ElevationSettings {
        request_budget,
        ..ElevationSettings::default()
    }
}

#[tokio::test]
async fn test_budget_caps_external_calls() {
    let source = CountingElevation::answering(1234.0);
    let mut service = ElevationService::new(source.clone(), settings(10));
    let model = EstimationModel::default();

    let points = fifteen_points();
    let mut readings = Vec::new();
    for point in &points {
        readings.push(service.lookup(point.latitude, point.longitude).await);
    }

    assert_eq!(source.calls(), 10);
    assert_eq!(service.external_calls(), 10);
    assert!(service.budget().is_exhausted());

    for reading in &readings[..10] {
        assert_eq!(reading.origin, ElevationOrigin::Remote);
        assert_eq!(reading.elevation_m, 1234.0);
    }
    for reading in &readings[10..] {
        assert_eq!(reading.origin, ElevationOrigin::Estimated);
        assert!(model.contains(reading.elevation_m));
    }
}

#[tokio::test]
async fn test_repeat_lookup_hits_cache_without_charging_budget() {
    let source = CountingElevation::answering(1180.0);
    let mut service = ElevationService::new(source.clone(), settings(10));

    let first = service.lookup(38.6403, 34.8451).await;
    let second = service.lookup(38.640_31, 34.845_14).await;

    assert_eq!(first.origin, ElevationOrigin::Remote);
    assert_eq!(second.origin, ElevationOrigin::Cached);
    assert_eq!(first.elevation_m, second.elevation_m);
    assert_eq!(source.calls(), 1);
    assert_eq!(service.budget().used(), 1);
}

#[tokio::test]
async fn test_exhausted_budget_skips_cache_entirely() {
    let source = CountingElevation::answering(1180.0);
    let mut service = ElevationService::new(source.clone(), settings(1));

    service.lookup(38.6403, 34.8451).await;
    let again = service.lookup(38.6403, 34.8451).await;

    assert_eq!(again.origin, ElevationOrigin::Estimated);
    assert_eq!(source.calls(), 1);
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn test_source_failure_estimates_without_caching() {
    let source = CountingElevation::failing();
    let mut service = ElevationService::new(source.clone(), settings(10));

    let reading = service.lookup(38.6403, 34.8451).await;

    assert_eq!(reading.origin, ElevationOrigin::Estimated);
    assert!(service.model().contains(reading.elevation_m));
    assert!(service.cache().is_empty());
    assert_eq!(service.budget().used(), 1);

    service.lookup(38.6403, 34.8451).await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_expired_entry_is_refetched() {
    let source = CountingElevation::answering(1300.0);
    let mut service = ElevationService::new(
        source.clone(),
        ElevationSettings {
            cache_ttl: Duration::from_secs(60),
            ..settings(10)
        },
    );
    let t0 = Utc.timestamp_opt(1_700_000_000, 0).unwrap();

    service.lookup_at(38.6403, 34.8451, t0).await;
    let fresh = service.lookup_at(38.6403, 34.8451, t0 + chrono::Duration::seconds(30)).await;
    let stale = service.lookup_at(38.6403, 34.8451, t0 + chrono::Duration::seconds(61)).await;

    assert_eq!(fresh.origin, ElevationOrigin::Cached);
    assert_eq!(stale.origin, ElevationOrigin::Remote);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_estimate_only_service_is_stable() {
    let mut service = ElevationService::new(EstimateOnly, settings(10));

    let first = service.elevation_at(38.6431, 34.8290).await;
    let second = service.elevation_at(38.6431, 34.8290).await;

    assert_eq!(first, second);
    assert_eq!(service.external_calls(), 0);
    assert_eq!(service.cache().len(), 1);
}

#[tokio::test]
async fn test_profile_follows_waypoint_order() {
    let mut service = ElevationService::new(EstimateOnly, settings(10));
    let tour = zigzag_tour();

    let profile = service.profile(&tour).await;

    assert_eq!(profile.points.len(), tour.len());
    assert_eq!(profile.points[0].distance_km, 0.0);
    for pair in profile.points.windows(2) {
        assert!(pair[1].distance_km > pair[0].distance_km);
    }
    assert!(profile.min_elevation <= profile.avg_elevation);
    assert!(profile.avg_elevation <= profile.max_elevation);
    assert_eq!(profile.elevation_gain, profile.max_elevation - profile.min_elevation);
    let net = profile.points[profile.points.len() - 1].elevation_meters - profile.points[0].elevation_meters;
    assert!((profile.total_ascent - profile.total_descent - net).abs() < 1e-9);
}

#[tokio::test]
async fn test_store_survives_service_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elevation.json");

    let source = CountingElevation::answering(1111.0);
    let mut first = ElevationService::new(source.clone(), settings(10)).with_store(ElevationStore::new(&path));
    first.lookup(38.6403, 34.8451).await;
    assert_eq!(source.calls(), 1);

    let restarted_source = CountingElevation::answering(9999.0);
    let mut second =
        ElevationService::new(restarted_source.clone(), settings(10)).with_store(ElevationStore::new(&path));
    let reading = second.lookup(38.6403, 34.8451).await;

    assert_eq!(reading.origin, ElevationOrigin::Cached);
    assert_eq!(reading.elevation_m, 1111.0);
    assert_eq!(restarted_source.calls(), 0);
}

#[tokio::test]
async fn test_corrupt_store_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elevation.json");
    std::fs::write(&path, "{not json").unwrap();

    let service = ElevationService::new(EstimateOnly, settings(10)).with_store(ElevationStore::new(&path));

    assert!(service.cache().is_empty());
}
