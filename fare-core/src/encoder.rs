//! Pre-fitted categorical encoders, loaded from JSON artifacts.
//!
//! The artifacts carry the per-column category lists captured at fit time.
//! Codes are positional, so the lists must be stored in the fitted order.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

use crate::{
    model::CabType,
    summary::{LongSummary, ShortSummary},
};

#[derive(Debug, Error, PartialEq)]
pub enum EncodeError {
    #[error("expected {expected} categorical values, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error("category '{value}' was not seen when column {column} was fitted")]
    UnknownCategory { column: usize, value: String },
}

fn read_artifact<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> Result<T> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} artifact: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {what} artifact: {}", path.display()))
}

fn validate_categories(categories: &[Vec<String>], what: &str) -> Result<()> {
    if categories.is_empty() {
        return Err(anyhow!("{what} has no columns"));
    }
    if let Some(column) = categories.iter().position(Vec::is_empty) {
        return Err(anyhow!("{what} column {column} has no categories"));
    }
    Ok(())
}

/// Maps each column's value to its index in that column's category list.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdinalEncoder {
    categories: Vec<Vec<String>>,
    /// Code used for unseen values; unseen values are an error when absent.
    #[serde(default)]
    unknown_value: Option<f64>,
}

impl OrdinalEncoder {
    pub fn new(categories: Vec<Vec<String>>, unknown_value: Option<f64>) -> Result<Self> {
        validate_categories(&categories, "ordinal encoder")?;
        Ok(Self { categories, unknown_value })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw: Self = read_artifact(path, "ordinal encoder")?;
        Self::new(raw.categories, raw.unknown_value)
    }

    pub fn columns(&self) -> usize {
        self.categories.len()
    }

    pub fn transform(&self, row: &[&str]) -> Result<Vec<f64>, EncodeError> {
        if row.len() != self.categories.len() {
            return Err(EncodeError::Arity { expected: self.categories.len(), actual: row.len() });
        }

        row.iter()
            .zip(&self.categories)
            .enumerate()
            .map(|(column, (value, known))| {
                match known.iter().position(|c| c == value) {
                    Some(code) => Ok(code as f64),
                    None => self.unknown_value.ok_or_else(|| EncodeError::UnknownCategory {
                        column,
                        value: (*value).to_string(),
                    }),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleUnknown {
    #[default]
    Error,
    /// Unseen values encode as all zeros.
    Ignore,
}

/// Expands each column into one indicator per known category.
#[derive(Debug, Clone, Deserialize)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
    #[serde(default)]
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn new(categories: Vec<Vec<String>>, handle_unknown: HandleUnknown) -> Result<Self> {
        validate_categories(&categories, "one-hot encoder")?;
        Ok(Self { categories, handle_unknown })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw: Self = read_artifact(path, "one-hot encoder")?;
        Self::new(raw.categories, raw.handle_unknown)
    }

    /// Width of the encoded output.
    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn transform(&self, row: &[&str]) -> Result<Vec<f64>, EncodeError> {
        if row.len() != self.categories.len() {
            return Err(EncodeError::Arity { expected: self.categories.len(), actual: row.len() });
        }

        let mut encoded = Vec::with_capacity(self.width());
        for (column, (value, known)) in row.iter().zip(&self.categories).enumerate() {
            let hit = known.iter().position(|c| c == value);
            if hit.is_none() && self.handle_unknown == HandleUnknown::Error {
                return Err(EncodeError::UnknownCategory { column, value: (*value).to_string() });
            }
            encoded.extend((0..known.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        }

        Ok(encoded)
    }
}

/// Numeric codes for the categorical part of the fare feature vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodedCategoricals {
    pub long_summary: f64,
    pub short_summary: f64,
    pub cab_type: f64,
    pub service_lyft: f64,
    pub service_uber: f64,
}

/// The two encoders the fare model was fitted with.
#[derive(Debug, Clone)]
pub struct FareEncoders {
    ordinal: OrdinalEncoder,
    one_hot: OneHotEncoder,
}

impl FareEncoders {
    /// The ordinal encoder must cover (long summary, short summary, cab type)
    /// and the one-hot encoder must expand service type into (Lyft, Uber).
    pub fn new(ordinal: OrdinalEncoder, one_hot: OneHotEncoder) -> Result<Self> {
        if ordinal.columns() != 3 {
            return Err(anyhow!(
                "Ordinal encoder has {} columns, expected 3 (long summary, short summary, cab type)",
                ordinal.columns()
            ));
        }
        if one_hot.categories.len() != 1 || one_hot.width() != 2 {
            return Err(anyhow!(
                "One-hot encoder must have a single service column with 2 categories, got {:?}",
                one_hot.categories
            ));
        }
        Ok(Self { ordinal, one_hot })
    }

    pub fn load(ordinal_path: &Path, one_hot_path: &Path) -> Result<Self> {
        Self::new(OrdinalEncoder::load(ordinal_path)?, OneHotEncoder::load(one_hot_path)?)
    }

    pub fn encode(
        &self,
        long_summary: LongSummary,
        short_summary: ShortSummary,
        cab: &CabType,
    ) -> Result<EncodedCategoricals, EncodeError> {
        let codes = self.ordinal.transform(&[
            long_summary.category(),
            short_summary.category(),
            cab.name(),
        ])?;
        let service = self.one_hot.transform(&[cab.service().as_str()])?;

        Ok(EncodedCategoricals {
            long_summary: codes[0],
            short_summary: codes[1],
            cab_type: codes[2],
            service_lyft: service[0],
            service_uber: service[1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ServiceType;
    use std::io::Write;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn ordinal_codes_follow_fitted_order() {
        let enc = OrdinalEncoder::new(
            vec![strings(&["b", "a"]), strings(&["x", "y", "z"])],
            None,
        )
        .unwrap();

        assert_eq!(enc.transform(&["a", "z"]).unwrap(), vec![1.0, 2.0]);
        assert_eq!(enc.transform(&["b", "x"]).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn ordinal_unknown_is_an_error_by_default() {
        let enc = OrdinalEncoder::new(vec![strings(&["a"])], None).unwrap();
        let err = enc.transform(&["nope"]).unwrap_err();
        assert_eq!(err, EncodeError::UnknownCategory { column: 0, value: "nope".into() });
    }

    #[test]
    fn ordinal_unknown_value_is_used_when_configured() {
        let enc = OrdinalEncoder::new(vec![strings(&["a"])], Some(-1.0)).unwrap();
        assert_eq!(enc.transform(&["nope"]).unwrap(), vec![-1.0]);
    }

    #[test]
    fn ordinal_rejects_wrong_arity() {
        let enc = OrdinalEncoder::new(vec![strings(&["a"]), strings(&["b"])], None).unwrap();
        let err = enc.transform(&["a"]).unwrap_err();
        assert_eq!(err, EncodeError::Arity { expected: 2, actual: 1 });
    }

    #[test]
    fn one_hot_sets_single_indicator() {
        let enc = OneHotEncoder::new(vec![strings(&["Lyft", "Uber"])], HandleUnknown::Error).unwrap();
        assert_eq!(enc.width(), 2);
        assert_eq!(enc.transform(&["Lyft"]).unwrap(), vec![1.0, 0.0]);
        assert_eq!(enc.transform(&["Uber"]).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn one_hot_unknown_handling() {
        let strict = OneHotEncoder::new(vec![strings(&["Lyft", "Uber"])], HandleUnknown::Error).unwrap();
        assert!(matches!(
            strict.transform(&["Via"]),
            Err(EncodeError::UnknownCategory { column: 0, .. })
        ));

        let lenient = OneHotEncoder::new(vec![strings(&["Lyft", "Uber"])], HandleUnknown::Ignore).unwrap();
        assert_eq!(lenient.transform(&["Via"]).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn empty_category_lists_are_rejected() {
        assert!(OrdinalEncoder::new(vec![], None).is_err());
        let err = OneHotEncoder::new(vec![vec![]], HandleUnknown::Error).unwrap_err();
        assert!(err.to_string().contains("column 0 has no categories"));
    }

    #[test]
    fn loads_artifacts_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"categories": [["Lyft", "Uber"]], "handle_unknown": "ignore"}}"#).unwrap();

        let enc = OneHotEncoder::load(file.path()).expect("artifact should load");
        assert_eq!(enc.transform(&["Taxi"]).unwrap(), vec![0.0, 0.0]);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "not json").unwrap();
        let err = OrdinalEncoder::load(bad.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse ordinal encoder artifact"));
    }
    fn fare_encoders() -> FareEncoders {
        let ordinal = OrdinalEncoder::new(
            vec![
                strings(&[" Partly cloudy throughout the day. ", " Rain throughout the day. "]),
                strings(&[" Clear ", " Rain "]),
                strings(&["Black", "Lux", "UberX"]),
            ],
            None,
        )
        .unwrap();
        let one_hot = OneHotEncoder::new(vec![strings(&["Lyft", "Uber"])], HandleUnknown::Error).unwrap();
        FareEncoders::new(ordinal, one_hot).unwrap()
    }

    #[test]
    fn fare_encoders_use_padded_summary_categories() {
        let cab = CabType::new(ServiceType::Uber, "UberX").unwrap();
        let encoded = fare_encoders()
            .encode(LongSummary::RainThroughoutTheDay, ShortSummary::Clear, &cab)
            .unwrap();

        assert_eq!(
            encoded,
            EncodedCategoricals {
                long_summary: 1.0,
                short_summary: 0.0,
                cab_type: 2.0,
                service_lyft: 0.0,
                service_uber: 1.0,
            }
        );
    }

    #[test]
    fn fare_encoders_report_unseen_cab() {
        let cab = CabType::new(ServiceType::Lyft, "Shared").unwrap();
        let err = fare_encoders()
            .encode(LongSummary::RainThroughoutTheDay, ShortSummary::Rain, &cab)
            .unwrap_err();

        assert_eq!(err, EncodeError::UnknownCategory { column: 2, value: "Shared".into() });
    }

    #[test]
    fn fare_encoders_check_shapes() {
        let ordinal = OrdinalEncoder::new(vec![strings(&["a"])], None).unwrap();
        let one_hot = OneHotEncoder::new(vec![strings(&["Lyft", "Uber"])], HandleUnknown::Error).unwrap();
        let err = FareEncoders::new(ordinal, one_hot).unwrap_err();
        assert!(err.to_string().contains("expected 3"));
    }
}
