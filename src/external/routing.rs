use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::CoreError;

const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    fn param(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub distance_km: f64,
    pub eta_minutes: i32,
    pub polyline: String,
}

/// Driving route lookup. `Ok(None)` means no route exists between the points.
#[async_trait]
pub trait RouteOracle: Send + Sync {
    async fn get_route(&self, origin: LatLng, dest: LatLng) -> Result<Option<Route>, CoreError>;
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    legs: Vec<DirectionsLeg>,
    overview_polyline: Polyline,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: ValueField,
    duration: ValueField,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: i64,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    points: String,
}

impl DirectionsResponse {
    fn into_route(self) -> Option<Route> {
        if self.status != "OK" {
            return None;
        }
        let route = self.routes.into_iter().next()?;
        let leg = route.legs.first()?;

        Some(Route {
            distance_km: leg.distance.value as f64 / 1000.0,
            eta_minutes: (leg.duration.value / 60) as i32,
            polyline: route.overview_polyline.points,
        })
    }
}

/// Google Directions API client with an in-memory cache of found routes.
#[derive(Clone)]
pub struct GoogleRouteOracle {
    cache: Arc<Cache<String, Route>>,
    client: reqwest::Client,
    api_key: String,
}

impl GoogleRouteOracle {
    pub fn new(api_key: &str, ttl: Duration) -> Self {
        let cache = Arc::new(
            Cache::builder()
                .time_to_live(ttl)
                .max_capacity(10_000)
                .build(),
        );

        Self {
            cache,
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
        }
    }

    async fn fetch_directions(
        &self,
        origin: LatLng,
        dest: LatLng,
    ) -> Result<DirectionsResponse, CoreError> {
        debug!(origin = %origin.param(), dest = %dest.param(), "fetching directions");

        let response = self
            .client
            .get(DIRECTIONS_URL)
            .query(&[
                ("origin", origin.param()),
                ("destination", dest.param()),
                ("mode", "driving".to_string()),
                ("units", "metric".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|e| CoreError::External(format!("Failed to fetch directions: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::External(format!(
                "Failed to fetch directions: HTTP {status}"
            )));
        }

        response
            .json::<DirectionsResponse>()
            .await
            .map_err(|e| CoreError::External(format!("Failed to parse directions: {e}")))
    }
}

#[async_trait]
impl RouteOracle for GoogleRouteOracle {
    async fn get_route(&self, origin: LatLng, dest: LatLng) -> Result<Option<Route>, CoreError> {
        let key = format!("{}|{}", origin.param(), dest.param());
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(Some(cached));
        }

        let directions = self.fetch_directions(origin, dest).await?;
        let status = directions.status.clone();
        match directions.into_route() {
            Some(route) => {
                self.cache.insert(key, route.clone()).await;
                Ok(Some(route))
            }
            None => {
                warn!(%status, "directions returned no route");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_leg_into_route() {
        let body = r#"{
            "status": "OK",
            "routes": [{
                "legs": [{"distance": {"value": 12500}, "duration": {"value": 1260}}],
                "overview_polyline": {"points": "abc123"}
            }]
        }"#;
        let parsed: DirectionsResponse = serde_json::from_str(body).unwrap();
        let route = parsed.into_route().unwrap();

        assert_eq!(route.distance_km, 12.5);
        assert_eq!(route.eta_minutes, 21);
        assert_eq!(route.polyline, "abc123");
    }

    #[test]
    fn zero_results_is_no_route() {
        let parsed: DirectionsResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "routes": []}"#).unwrap();
        assert!(parsed.into_route().is_none());
    }

    #[test]
    fn coordinates_outside_range_are_invalid() {
        assert!(LatLng::new(-26.3, 31.1).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, -181.0).is_valid());
    }
}
