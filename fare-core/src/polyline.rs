//! Decoder for the Google encoded polyline format.
//!
//! Each coordinate is a zig-zag encoded delta from the previous point,
//! scaled by 1e5 and emitted as 5-bit chunks offset by 63, with bit 0x20
//! set on every chunk except the last.

use thiserror::Error;

use crate::model::Coordinates;

const PRECISION: f64 = 1e5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("invalid polyline character {byte:#04x} at offset {offset}")]
    InvalidCharacter { byte: u8, offset: usize },

    #[error("polyline ends in the middle of a value at offset {0}")]
    Truncated(usize),

    #[error("polyline value at offset {0} overflows")]
    Overflow(usize),
}

/// Decode an encoded polyline into ordered points. No simplification is applied.
pub fn decode(encoded: &str) -> Result<Vec<Coordinates>, PolylineError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut offset = 0;
    let mut lat: i64 = 0;
    let mut lon: i64 = 0;

    while offset < bytes.len() {
        let start = offset;
        lat = lat.checked_add(next_delta(bytes, &mut offset)?).ok_or(PolylineError::Overflow(start))?;
        let start = offset;
        lon = lon.checked_add(next_delta(bytes, &mut offset)?).ok_or(PolylineError::Overflow(start))?;
        points.push(Coordinates::new(lat as f64 / PRECISION, lon as f64 / PRECISION));
    }

    Ok(points)
}

fn next_delta(bytes: &[u8], offset: &mut usize) -> Result<i64, PolylineError> {
    let start = *offset;
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*offset).ok_or(PolylineError::Truncated(start))?;
        if !(63..127).contains(&byte) {
            return Err(PolylineError::InvalidCharacter { byte, offset: *offset });
        }
        if shift > 60 {
            return Err(PolylineError::Overflow(start));
        }

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *offset += 1;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 { !(result >> 1) } else { result >> 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &Coordinates, lat: f64, lon: f64) {
        assert!((actual.latitude - lat).abs() < 1e-9, "lat {} != {}", actual.latitude, lat);
        assert!((actual.longitude - lon).abs() < 1e-9, "lon {} != {}", actual.longitude, lon);
    }

    #[test]
    fn decodes_reference_polyline() {
        // Example from the format documentation.
        let points = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").expect("valid polyline");

        assert_eq!(points.len(), 3);
        assert_close(&points[0], 38.5, -120.2);
        assert_close(&points[1], 40.7, -120.95);
        assert_close(&points[2], 43.252, -126.453);
    }

    #[test]
    fn empty_string_has_no_points() {
        assert_eq!(decode("").unwrap(), Vec::new());
    }

    #[test]
    fn truncated_input_is_rejected() {
        // Latitude only, the longitude never arrives.
        assert_eq!(decode("_p~iF").unwrap_err(), PolylineError::Truncated(5));
        // Continuation bit set on the last byte.
        assert!(matches!(decode("_p~iF~ps|"), Err(PolylineError::Truncated(_))));
    }

    #[test]
    fn accumulated_overflow_is_an_error() {
        // Each latitude delta is close to i64::MAX / 2, so the third one overflows.
        let point = format!("}}{}F?", "~".repeat(11));
        let encoded = point.repeat(3);

        assert_eq!(decode(&encoded).unwrap_err(), PolylineError::Overflow(point.len() * 2));
        assert_eq!(decode(&point.repeat(2)).map(|p| p.len()), Ok(2));
    }

    #[test]
    fn invalid_character_is_rejected() {
        let err = decode("_p~iF ps|U").unwrap_err();
        assert_eq!(err, PolylineError::InvalidCharacter { byte: b' ', offset: 5 });
    }
}
