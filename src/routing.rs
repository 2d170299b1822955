//! HTTP adapter for the walking-path routing capability.
//!
//! The capability has answered in more than one shape over time: an envelope
//! with per-segment polylines, an envelope with one flat polyline, or a bare
//! route body. Every shape is decoded by a single untagged union here and
//! normalized into [`RouteSegment`]s, so nothing downstream sees the variance.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RoutingError;
use crate::model::{RouteSegment, Waypoint};
use crate::polyline::Polyline;
use crate::traits::RoutingService;

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Full URL of the walking-route endpoint.
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/api/route/walking".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRoutingClient {
    config: RoutingConfig,
    client: reqwest::Client,
}

impl HttpRoutingClient {
    pub fn new(config: RoutingConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }
}

impl RoutingService for HttpRoutingClient {
    async fn route(&self, waypoints: &[Waypoint]) -> Result<Vec<RouteSegment>, RoutingError> {
        if waypoints.len() < 2 {
            return Ok(Vec::new());
        }

        let request = RouteRequest {
            waypoints: waypoints
                .iter()
                .map(|w| WireWaypoint {
                    lat: w.latitude,
                    lng: w.longitude,
                    name: &w.name,
                })
                .collect(),
        };

        let body = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        debug!(bytes = body.len(), "routing response received");
        decode_route(&body, waypoints)
    }
}

/// Decode a raw routing response body into one segment per consecutive
/// waypoint pair.
pub fn decode_route(body: &[u8], waypoints: &[Waypoint]) -> Result<Vec<RouteSegment>, RoutingError> {
    let response: RouteResponse =
        serde_json::from_slice(body).map_err(|err| RoutingError::Format(err.to_string()))?;
    normalize(response, waypoints)
}

#[derive(Debug, Serialize)]
struct RouteRequest<'a> {
    waypoints: Vec<WireWaypoint<'a>>,
}

#[derive(Debug, Serialize)]
struct WireWaypoint<'a> {
    lat: f64,
    lng: f64,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RouteResponse {
    Envelope {
        success: bool,
        route: Option<RouteBody>,
        error: Option<String>,
    },
    Bare(RouteBody),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RouteBody {
    Segmented { segments: Vec<WireSegment> },
    Flat { coordinates: Vec<WireCoordinate> },
    Nested { geometry: WireGeometry },
}

#[derive(Debug, Deserialize)]
struct WireSegment {
    distance: Option<f64>,
    coordinates: Vec<WireCoordinate>,
    #[serde(default)]
    fallback: bool,
}

#[derive(Debug, Deserialize)]
struct WireGeometry {
    coordinates: Vec<WireCoordinate>,
}

/// Either `{"lat": .., "lng": ..}` or a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum WireCoordinate {
    Object {
        lat: f64,
        #[serde(alias = "lon")]
        lng: f64,
    },
    Pair([f64; 2]),
}

impl WireCoordinate {
    fn as_tuple(self) -> (f64, f64) {
        match self {
            WireCoordinate::Object { lat, lng } => (lat, lng),
            WireCoordinate::Pair([lat, lng]) => (lat, lng),
        }
    }
}

fn to_polyline(coordinates: Vec<WireCoordinate>) -> Polyline {
    Polyline::new(coordinates.into_iter().map(WireCoordinate::as_tuple).collect())
}

fn normalize(response: RouteResponse, waypoints: &[Waypoint]) -> Result<Vec<RouteSegment>, RoutingError> {
    let body = match response {
        RouteResponse::Envelope { success: false, error, .. } => {
            return Err(RoutingError::Rejected(
                error.unwrap_or_else(|| "success=false".to_string()),
            ));
        }
        RouteResponse::Envelope { route: None, .. } => {
            return Err(RoutingError::Format("response has no route".to_string()));
        }
        RouteResponse::Envelope { route: Some(body), .. } | RouteResponse::Bare(body) => body,
    };

    match body {
        RouteBody::Segmented { segments } => from_segments(segments, waypoints),
        RouteBody::Flat { coordinates } | RouteBody::Nested { geometry: WireGeometry { coordinates } } => {
            split_flat(to_polyline(coordinates), waypoints)
        }
    }
}

fn from_segments(segments: Vec<WireSegment>, waypoints: &[Waypoint]) -> Result<Vec<RouteSegment>, RoutingError> {
    let expected = waypoints.len().saturating_sub(1);
    if segments.len() != expected {
        return Err(RoutingError::Format(format!(
            "expected {} segments, got {}",
            expected,
            segments.len()
        )));
    }

    segments
        .into_iter()
        .zip(waypoints.windows(2))
        .map(|(segment, pair)| {
            let coordinates = to_polyline(segment.coordinates);
            if coordinates.len() < 2 {
                return Err(RoutingError::Format(format!(
                    "segment {} -> {} has fewer than two points",
                    pair[0].id, pair[1].id
                )));
            }
            let distance_km = match segment.distance {
                Some(km) if km.is_finite() && km >= 0.0 => km,
                _ => coordinates.length_km(),
            };
            Ok(RouteSegment {
                from_waypoint_id: pair[0].id.clone(),
                to_waypoint_id: pair[1].id.clone(),
                coordinates,
                distance_km,
                is_fallback: segment.fallback,
            })
        })
        .collect()
}

/// Cut one route-wide polyline into per-leg segments at the vertex nearest
/// each interior waypoint. Cuts only move forward along the line.
fn split_flat(polyline: Polyline, waypoints: &[Waypoint]) -> Result<Vec<RouteSegment>, RoutingError> {
    if waypoints.len() < 2 {
        return Ok(Vec::new());
    }
    if polyline.len() < 2 {
        return Err(RoutingError::Format("route geometry has fewer than two points".to_string()));
    }

    let last = polyline.len() - 1;
    let mut cuts = Vec::with_capacity(waypoints.len());
    cuts.push(0);
    for waypoint in &waypoints[1..waypoints.len() - 1] {
        let from = cuts.last().copied().unwrap_or(0);
        cuts.push(polyline.nearest_vertex_from(from, waypoint.location()).unwrap_or(last));
    }
    cuts.push(last);

    let points = polyline.points();
    let segments = cuts
        .windows(2)
        .zip(waypoints.windows(2))
        .map(|(cut, pair)| {
            let slice = &points[cut[0]..=cut[1]];
            let coordinates = if slice.len() < 2 {
                Polyline::chord(slice[0], slice[0])
            } else {
                Polyline::new(slice.to_vec())
            };
            RouteSegment {
                from_waypoint_id: pair[0].id.clone(),
                to_waypoint_id: pair[1].id.clone(),
                distance_km: coordinates.length_km(),
                coordinates,
                is_fallback: false,
            }
        })
        .collect();

    Ok(segments)
}
