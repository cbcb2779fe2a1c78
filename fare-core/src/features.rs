//! Assembly of the fixed-order feature vector the fare model consumes.

use chrono::{Datelike, NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

use crate::{encoder::EncodedCategoricals, model::WeatherSnapshot};

pub const FEATURE_COUNT: usize = 17;

/// Column names in model order. Changing the order requires retraining.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "hour",
    "day",
    "month",
    "distance",
    "surge_multiplier",
    "temperature",
    "apparent_temperature",
    "precip_intensity",
    "precip_probability",
    "humidity",
    "wind_speed",
    "visibility",
    "long_summary",
    "short_summary",
    "name",
    "cab_type_lyft",
    "cab_type_uber",
];

/// No live surge data is available.
pub const SURGE_MULTIPLIER: f64 = 1.0;

const FEET_PER_MILE: f64 = 5280.0;

static DISTANCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<value>\d+(?:\.\d+)?)\s*(?P<unit>[A-Za-z]+)?").expect("distance pattern is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum DistanceParseError {
    #[error("no distance value found in '{0}'")]
    Missing(String),

    #[error("distance in '{0}' is not positive")]
    NotPositive(String),

    #[error("unsupported distance unit '{unit}' in '{text}'")]
    UnsupportedUnit { unit: String, text: String },
}

/// Miles in a provider distance text such as "9.7 mi", "1,204 mi" or "500 ft".
///
/// The first number is read along with its unit. A bare number is taken as miles.
pub fn parse_distance(text: &str) -> Result<f64, DistanceParseError> {
    let cleaned = text.replace(',', "");
    let caps = DISTANCE
        .captures(&cleaned)
        .ok_or_else(|| DistanceParseError::Missing(text.to_string()))?;
    let value: f64 = caps["value"]
        .parse()
        .map_err(|_| DistanceParseError::Missing(text.to_string()))?;

    let miles = match caps.name("unit").map(|u| u.as_str().to_lowercase()).as_deref() {
        None | Some("mi") => value,
        Some("ft") => value / FEET_PER_MILE,
        Some(unit) => {
            return Err(DistanceParseError::UnsupportedUnit {
                unit: unit.to_string(),
                text: text.to_string(),
            });
        }
    };

    if miles > 0.0 { Ok(miles) } else { Err(DistanceParseError::NotPositive(text.to_string())) }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn assemble(
        at: NaiveDateTime,
        distance_miles: f64,
        weather: &WeatherSnapshot,
        codes: &EncodedCategoricals,
    ) -> Self {
        Self([
            f64::from(at.hour()),
            f64::from(at.day()),
            f64::from(at.month()),
            distance_miles,
            SURGE_MULTIPLIER,
            weather.temperature,
            weather.feels_like,
            weather.precip_intensity,
            weather.precip_probability,
            weather.humidity,
            weather.wind_speed,
            weather.visibility_km,
            codes.long_summary,
            codes.short_summary,
            codes.cab_type,
            codes.service_lyft,
            codes.service_uber,
        ])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Column names paired with their values, in model order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{LongSummary, ShortSummary};
    use chrono::NaiveDate;

    fn weather() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 61.5,
            feels_like: 60.1,
            humidity: 72.0,
            wind_speed: 4.6,
            visibility_km: 10.0,
            precip_intensity: 0.0,
            precip_probability: 0.0,
            description: "light rain".into(),
            short_summary: ShortSummary::Rain,
            long_summary: LongSummary::PartlyCloudyThroughoutTheDay,
        }
    }

    #[test]
    fn assembles_seventeen_values_in_model_order() {
        let at = NaiveDate::from_ymd_opt(2024, 11, 26).unwrap().and_hms_opt(18, 5, 0).unwrap();
        let codes = EncodedCategoricals {
            long_summary: 4.0,
            short_summary: 6.0,
            cab_type: 10.0,
            service_lyft: 0.0,
            service_uber: 1.0,
        };

        let v = FeatureVector::assemble(at, 9.7, &weather(), &codes);

        assert_eq!(v.as_slice().len(), FEATURE_COUNT);
        assert_eq!(
            v.as_slice(),
            &[18.0, 26.0, 11.0, 9.7, 1.0, 61.5, 60.1, 0.0, 0.0, 72.0, 4.6, 10.0, 4.0, 6.0, 10.0, 0.0, 1.0]
        );
        let named: Vec<_> = v.named().collect();
        assert_eq!(named[3], ("distance", 9.7));
        assert_eq!(named[16], ("cab_type_uber", 1.0));
    }

    #[test]
    fn parses_first_decimal() {
        assert_eq!(parse_distance("9.7 mi").unwrap(), 9.7);
        assert_eq!(parse_distance("about 12.25 mi (3.1 km)").unwrap(), 12.25);
    }

    #[test]
    fn parses_integers_and_thousands_separators() {
        assert_eq!(parse_distance("12 mi").unwrap(), 12.0);
        assert_eq!(parse_distance("1,204 mi").unwrap(), 1204.0);
    }

    #[test]
    fn feet_are_converted_to_miles() {
        assert_eq!(parse_distance("500 ft").unwrap(), 500.0 / 5280.0);
        assert_eq!(parse_distance("5,280 ft").unwrap(), 1.0);
        assert_eq!(parse_distance("1 mi").unwrap(), 1.0);
    }

    #[test]
    fn other_units_are_rejected() {
        assert_eq!(
            parse_distance("3.1 km").unwrap_err(),
            DistanceParseError::UnsupportedUnit { unit: "km".into(), text: "3.1 km".into() }
        );
    }

    #[test]
    fn rejects_missing_or_zero_distance() {
        assert_eq!(parse_distance("mi").unwrap_err(), DistanceParseError::Missing("mi".into()));
        assert_eq!(parse_distance("0.0 mi").unwrap_err(), DistanceParseError::NotPositive("0.0 mi".into()));
    }
}
