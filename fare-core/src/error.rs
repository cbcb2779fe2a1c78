use thiserror::Error;

use crate::{
    encoder::EncodeError, features::DistanceParseError, predictor::ModelError,
    provider::DistanceError,
};

/// Why an estimation stopped. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("Failed to geocode one or both addresses.")]
    Geocode,

    #[error("Source and destination address cannot be the same")]
    SameAddress,

    #[error("{0}")]
    Distance(#[from] DistanceError),

    #[error("Could not read the road distance: {0}")]
    DistanceValue(#[from] DistanceParseError),

    #[error("Failed to fetch the current weather: {0:#}")]
    Weather(anyhow::Error),

    #[error("Failed to encode the ride details: {0}")]
    Encode(#[from] EncodeError),

    #[error("Failed to predict the fare: {0}")]
    Predict(#[from] ModelError),
}
