//! The estimation flow: geocode, distance, weather, encode, predict, route.
//!
//! Steps run strictly one after another and the first failure ends the
//! request. Only the route lookup is allowed to fail without failing the
//! estimate.

use anyhow::Result;
use chrono::{Local, NaiveDateTime};

use crate::{
    Config,
    encoder::FareEncoders,
    error::EstimateError,
    features::{FeatureVector, parse_distance},
    model::{Coordinates, FareQuote, FareRequest, Route},
    polyline,
    predictor::{FarePredictor, TreeEnsemble},
    provider::Providers,
};

/// Everything needed to price a ride, built once at startup and never mutated.
#[derive(Debug)]
pub struct FareEstimator {
    providers: Providers,
    encoders: FareEncoders,
    model: Box<dyn FarePredictor>,
}

impl FareEstimator {
    pub fn new(providers: Providers, encoders: FareEncoders, model: Box<dyn FarePredictor>) -> Self {
        Self { providers, encoders, model }
    }

    /// Build providers from the configured keys and load the three artifacts.
    pub fn from_config(config: &Config) -> Result<Self> {
        let providers = Providers::from_config(config)?;
        let paths = &config.artifacts;
        let encoders = FareEncoders::load(&paths.ordinal_encoder, &paths.one_hot_encoder)?;
        let model = TreeEnsemble::load(&paths.model)?;
        tracing::info!(trees = model.tree_count(), "fare model loaded");

        Ok(Self::new(providers, encoders, Box::new(model)))
    }

    pub async fn estimate(&self, request: &FareRequest) -> Result<FareQuote, EstimateError> {
        self.estimate_at(request, Local::now().naive_local()).await
    }

    /// Estimate as if the ride were requested at `at` (local wall-clock time).
    pub async fn estimate_at(
        &self,
        request: &FareRequest,
        at: NaiveDateTime,
    ) -> Result<FareQuote, EstimateError> {
        let source = self.geocode(&request.source).await;
        let destination = self.geocode(&request.destination).await;
        let (Some(source), Some(destination)) = (source, destination) else {
            return Err(EstimateError::Geocode);
        };

        if source == destination {
            return Err(EstimateError::SameAddress);
        }

        let distance = self
            .providers
            .distance
            .road_distance(&request.source, &request.destination)
            .await?;
        let distance_miles = parse_distance(&distance.text)?;

        let weather = self
            .providers
            .weather
            .current_weather(source)
            .await
            .map_err(EstimateError::Weather)?;

        let codes = self.encoders.encode(weather.long_summary, weather.short_summary, &request.cab)?;
        let features = FeatureVector::assemble(at, distance_miles, &weather, &codes);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let named: Vec<String> = features.named().map(|(name, value)| format!("{name}={value}")).collect();
            tracing::debug!(features = %named.join(" "), "assembled feature vector");
        }

        let fare = self.model.predict(&features)?;
        tracing::info!(
            fare,
            distance = %distance.text,
            service = %request.service(),
            cab = %request.cab,
            "fare predicted"
        );

        let route = self.route(source, destination).await;

        Ok(FareQuote {
            fare,
            distance_text: distance.text,
            distance_miles,
            source,
            destination,
            weather,
            route,
        })
    }

    /// Provider errors count as "not found"; the user sees one message either way.
    async fn geocode(&self, address: &str) -> Option<Coordinates> {
        match self.providers.geocoder.geocode(address).await {
            Ok(coords) => coords,
            Err(err) => {
                tracing::warn!(address, error = %format!("{err:#}"), "geocoding failed");
                None
            }
        }
    }

    async fn route(&self, from: Coordinates, to: Coordinates) -> Option<Route> {
        let encoded = match self.providers.route.route_polyline(from, to).await {
            Ok(Some(encoded)) => encoded,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "directions lookup failed");
                return None;
            }
        };

        match polyline::decode(&encoded) {
            Ok(points) => Some(Route { points }),
            Err(err) => {
                tracing::warn!(error = %err, "directions returned an undecodable polyline");
                None
            }
        }
    }
}
