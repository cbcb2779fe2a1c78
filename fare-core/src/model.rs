use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::summary::{LongSummary, ShortSummary};

/// A geocoded point, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Point halfway between `self` and `other` (plain average, fine for city distances).
    pub fn midpoint(&self, other: &Coordinates) -> Coordinates {
        Coordinates {
            latitude: (self.latitude + other.latitude) / 2.0,
            longitude: (self.longitude + other.longitude) / 2.0,
        }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Current conditions at the pickup point, imperial units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub visibility_km: f64,
    /// Always 0: the current-weather endpoint carries no precipitation data.
    pub precip_intensity: f64,
    pub precip_probability: f64,
    pub description: String,
    pub short_summary: ShortSummary,
    pub long_summary: LongSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Lyft,
    Uber,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Lyft => "Lyft",
            ServiceType::Uber => "Uber",
        }
    }

    pub const fn all() -> &'static [ServiceType] {
        &[ServiceType::Lyft, ServiceType::Uber]
    }

    /// Cab types offered by this service, in menu order.
    pub const fn cab_types(&self) -> &'static [&'static str] {
        match self {
            ServiceType::Lyft => &["Shared", "Lux", "Lyft", "Lux Black XL", "Lyft XL", "Lux Black"],
            ServiceType::Uber => &["UberXL", "Black", "UberX", "WAV", "Black SUV", "UberPool", "Taxi"],
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "lyft" => Ok(ServiceType::Lyft),
            "uber" => Ok(ServiceType::Uber),
            _ => Err(anyhow!("Unknown service type '{value}'. Supported services: Lyft, Uber.")),
        }
    }
}

/// A cab type that is known to be offered by its service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabType {
    service: ServiceType,
    name: &'static str,
}

impl CabType {
    /// Look up `name` (case-insensitive) in the service's catalogue.
    pub fn new(service: ServiceType, name: &str) -> anyhow::Result<Self> {
        service
            .cab_types()
            .iter()
            .copied()
            .find(|cab| cab.eq_ignore_ascii_case(name.trim()))
            .map(|cab| Self { service, name: cab })
            .ok_or_else(|| {
                anyhow!(
                    "{service} does not offer cab type '{name}'. Available: {}.",
                    service.cab_types().join(", ")
                )
            })
    }

    pub fn service(&self) -> ServiceType {
        self.service
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for CabType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// One user-triggered estimation.
#[derive(Debug, Clone)]
pub struct FareRequest {
    pub source: String,
    pub destination: String,
    pub cab: CabType,
}

impl FareRequest {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, cab: CabType) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            cab,
        }
    }

    pub fn service(&self) -> ServiceType {
        self.cab.service()
    }
}

/// Road distance as the routing provider formats it, e.g. "5.2 mi".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadDistance {
    pub text: String,
}

/// Decoded route geometry, ordered from source to destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub points: Vec<Coordinates>,
}

/// Result of a successful estimation.
#[derive(Debug, Clone, Serialize)]
pub struct FareQuote {
    pub fare: f64,
    pub distance_text: String,
    pub distance_miles: f64,
    pub source: Coordinates,
    pub destination: Coordinates,
    pub weather: WeatherSnapshot,
    /// `None` when the directions lookup failed; the fare is still valid.
    pub route: Option<Route>,
}

impl FareQuote {
    pub fn message(&self) -> String {
        format!("Predicted Fare: ${:.2} for a distance of {}", self.fare, self.distance_text)
    }
}
