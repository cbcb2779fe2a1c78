use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    model::{Coordinates, WeatherSnapshot},
    summary,
};

use super::{WeatherProvider, get_json, http_client};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
    /// Metres.
    visibility: Option<f64>,
}

impl From<OwCurrentResponse> for WeatherSnapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        let description = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.description.to_lowercase())
            .unwrap_or_default();
        let (short_summary, long_summary) = summary::classify(&description);

        WeatherSnapshot {
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            humidity: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            visibility_km: parsed.visibility.unwrap_or(0.0) / 1000.0,
            precip_intensity: 0.0,
            precip_probability: 0.0,
            description,
            short_summary,
            long_summary,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(&self, at: Coordinates) -> Result<WeatherSnapshot> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();

        let parsed: OwCurrentResponse = get_json(
            &self.http,
            &url,
            &[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "imperial"),
            ],
            "OpenWeather current weather",
        )
        .await?;

        let snapshot = WeatherSnapshot::from(parsed);
        tracing::debug!(
            description = %snapshot.description,
            short = %snapshot.short_summary,
            long = %snapshot.long_summary,
            "classified weather"
        );
        Ok(snapshot)
    }
}
