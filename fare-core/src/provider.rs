use crate::{
    Config,
    model::{Coordinates, RoadDistance, WeatherSnapshot},
    provider::{google::GoogleMapsProvider, opencage::OpenCageGeocoder, openweather::OpenWeatherProvider},
};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

pub mod google;
pub mod opencage;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenCage,
    Google,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenCage => "opencage",
            ProviderId::Google => "google",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenCage, ProviderId::Google, ProviderId::OpenWeather]
    }

    /// Environment variable holding this provider's API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenCage => "OPENCAGE_API_KEY",
            ProviderId::Google => "GOOGLE_MAPS_API_KEY",
            ProviderId::OpenWeather => "OPENWEATHER_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::OpenCage => "https://api.opencagedata.com",
            ProviderId::Google => "https://maps.googleapis.com",
            ProviderId::OpenWeather => "https://api.openweathermap.org",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "opencage" => Ok(ProviderId::OpenCage),
            "google" => Ok(ProviderId::Google),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow!(
                "Unknown provider '{value}'. Supported providers: opencage, google, openweather."
            )),
        }
    }
}

/// Failure of a road-distance lookup.
///
/// The `Display` texts are what the user is shown.
#[derive(Debug, Error)]
pub enum DistanceError {
    /// The matrix element came back with a non-OK status, e.g. `NOT_FOUND`.
    #[error("Error: {0}")]
    Status(String),

    #[error("Error: No data available.")]
    NoData,

    #[error("Error: request failed: {0:#}")]
    Transport(anyhow::Error),
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// First candidate for `address`, or `None` when the provider has no match.
    async fn geocode(&self, address: &str) -> anyhow::Result<Option<Coordinates>>;
}

#[async_trait]
pub trait DistanceProvider: Send + Sync + Debug {
    async fn road_distance(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<RoadDistance, DistanceError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(&self, at: Coordinates) -> anyhow::Result<WeatherSnapshot>;
}

#[async_trait]
pub trait RouteProvider: Send + Sync + Debug {
    /// Encoded overview polyline, or `None` when no route was found.
    async fn route_polyline(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> anyhow::Result<Option<String>>;
}

/// The external services one estimation talks to.
#[derive(Debug)]
pub struct Providers {
    pub geocoder: Box<dyn Geocoder>,
    pub distance: Box<dyn DistanceProvider>,
    pub weather: Box<dyn WeatherProvider>,
    pub route: Box<dyn RouteProvider>,
}

impl Providers {
    /// Construct every provider from config. All three API keys are required.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let timeout = config.http.timeout();

        let geocoder = OpenCageGeocoder::new(
            config.require_api_key(ProviderId::OpenCage)?.to_owned(),
            config.endpoint(ProviderId::OpenCage),
            timeout,
        )?;
        let google = GoogleMapsProvider::new(
            config.require_api_key(ProviderId::Google)?.to_owned(),
            config.endpoint(ProviderId::Google),
            timeout,
        )?;
        let weather = OpenWeatherProvider::new(
            config.require_api_key(ProviderId::OpenWeather)?.to_owned(),
            config.endpoint(ProviderId::OpenWeather),
            timeout,
        )?;

        Ok(Self {
            geocoder: Box::new(geocoder),
            distance: Box::new(google.clone()),
            weather: Box::new(weather),
            route: Box::new(google),
        })
    }
}

pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("fare-estimator/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and decode a JSON body, failing on non-success statuses.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    query: &[(&str, &str)],
    what: &str,
) -> anyhow::Result<T> {
    tracing::debug!(url, what, "sending request");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("Failed to send request to {what}"))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read {what} response body"))?;

    if !status.is_success() {
        return Err(anyhow!(
            "{what} request failed with status {}: {}",
            status,
            truncate_body(&body),
        ));
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse {what} JSON"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
