use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::model::Coordinates;

use super::{Geocoder, get_json, http_client};

/// Forward geocoding through the OpenCage API.
#[derive(Debug, Clone)]
pub struct OpenCageGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenCageGeocoder {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OcGeometry {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct OcResult {
    geometry: OcGeometry,
}

#[derive(Debug, Deserialize)]
struct OcResponse {
    #[serde(default)]
    results: Vec<OcResult>,
}

#[async_trait]
impl Geocoder for OpenCageGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let url = format!("{}/geocode/v1/json", self.base_url);

        let parsed: OcResponse = get_json(
            &self.http,
            &url,
            &[("q", address), ("key", self.api_key.as_str())],
            "OpenCage geocoding",
        )
        .await?;

        let coords = parsed
            .results
            .first()
            .map(|r| Coordinates::new(r.geometry.lat, r.geometry.lng));

        tracing::debug!(address, found = coords.is_some(), "geocoded address");
        Ok(coords)
    }
}
