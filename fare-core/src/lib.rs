//! Core library for the `fare` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Adapters for the geocoding, routing and weather services
//! - The categorical encoders and the fare model
//! - The estimation pipeline tying them together
//!
//! It is used by `fare-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod map;
pub mod model;
pub mod pipeline;
pub mod polyline;
pub mod predictor;
pub mod provider;
pub mod summary;

pub use config::{ArtifactPaths, Config, HttpConfig, ProviderConfig};
pub use error::EstimateError;
pub use map::RouteMap;
pub use model::{CabType, Coordinates, FareQuote, FareRequest, Route, ServiceType, WeatherSnapshot};
pub use pipeline::FareEstimator;
pub use provider::{ProviderId, Providers};
