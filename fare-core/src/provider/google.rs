use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::{Coordinates, RoadDistance};

use super::{DistanceError, DistanceProvider, RouteProvider, get_json, http_client};

/// Google Maps Distance Matrix and Directions APIs.
#[derive(Debug, Clone)]
pub struct GoogleMapsProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl GoogleMapsProvider {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GmText {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GmElement {
    status: String,
    distance: Option<GmText>,
}

#[derive(Debug, Deserialize)]
struct GmRow {
    #[serde(default)]
    elements: Vec<GmElement>,
}

#[derive(Debug, Deserialize)]
struct GmMatrixResponse {
    #[serde(default)]
    rows: Vec<GmRow>,
}

#[derive(Debug, Deserialize)]
struct GmPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct GmRoute {
    overview_polyline: GmPolyline,
}

#[derive(Debug, Deserialize)]
struct GmDirectionsResponse {
    status: String,
    #[serde(default)]
    routes: Vec<GmRoute>,
}

fn first_element(parsed: GmMatrixResponse) -> Result<RoadDistance, DistanceError> {
    let element = parsed
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or(DistanceError::NoData)?;

    if element.status != "OK" {
        return Err(DistanceError::Status(element.status));
    }

    element
        .distance
        .map(|d| RoadDistance { text: d.text })
        .ok_or(DistanceError::NoData)
}

#[async_trait]
impl DistanceProvider for GoogleMapsProvider {
    async fn road_distance(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<RoadDistance, DistanceError> {
        let url = format!("{}/maps/api/distancematrix/json", self.base_url);

        let parsed: GmMatrixResponse = get_json(
            &self.http,
            &url,
            &[
                ("origins", origin),
                ("destinations", destination),
                ("units", "imperial"),
                ("key", self.api_key.as_str()),
            ],
            "Google Distance Matrix",
        )
        .await
        .map_err(DistanceError::Transport)?;

        first_element(parsed)
    }
}

#[async_trait]
impl RouteProvider for GoogleMapsProvider {
    async fn route_polyline(&self, from: Coordinates, to: Coordinates) -> Result<Option<String>> {
        let url = format!("{}/maps/api/directions/json", self.base_url);
        let origin = from.to_string();
        let destination = to.to_string();

        let parsed: GmDirectionsResponse = get_json(
            &self.http,
            &url,
            &[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("key", self.api_key.as_str()),
            ],
            "Google Directions",
        )
        .await?;

        if parsed.status != "OK" {
            tracing::warn!(status = %parsed.status, "directions lookup returned no route");
            return Ok(None);
        }

        Ok(parsed.routes.into_iter().next().map(|r| r.overview_polyline.points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(json: serde_json::Value) -> GmMatrixResponse {
        serde_json::from_value(json).expect("matrix JSON should parse")
    }

    #[test]
    fn ok_element_yields_distance_text() {
        let parsed = matrix(serde_json::json!({
            "rows": [{"elements": [{"status": "OK", "distance": {"text": "9.7 mi", "value": 15611}}]}]
        }));
        assert_eq!(first_element(parsed).unwrap().text, "9.7 mi");
    }

    #[test]
    fn non_ok_element_reports_status() {
        let parsed = matrix(serde_json::json!({
            "rows": [{"elements": [{"status": "NOT_FOUND"}]}]
        }));
        assert_eq!(first_element(parsed).unwrap_err().to_string(), "Error: NOT_FOUND");
    }

    #[test]
    fn missing_rows_or_elements_is_no_data() {
        let no_rows = matrix(serde_json::json!({"rows": [], "status": "INVALID_REQUEST"}));
        assert!(matches!(first_element(no_rows), Err(DistanceError::NoData)));

        let no_elements = matrix(serde_json::json!({"rows": [{"elements": []}]}));
        assert_eq!(first_element(no_elements).unwrap_err().to_string(), "Error: No data available.");
    }
}
