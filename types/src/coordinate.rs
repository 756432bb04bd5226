//! Geographic coordinate in decimal degrees.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// A point on the earth's surface, in decimal degrees (WGS84).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a validated coordinate.
    pub fn new(lat: f64, lon: f64) -> Result<Self, TypesError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(TypesError::NonFiniteCoordinate);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(TypesError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(TypesError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Parse a coordinate from decimal strings, longitude first.
    ///
    /// Some providers embed positions as `{x: "<lon>", y: "<lat>"}` strings.
    pub fn from_decimal_strings(lon: &str, lat: &str) -> Result<Self, TypesError> {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|e| TypesError::UnparseableCoordinate {
                    value: value.to_string(),
                    reason: e.to_string(),
                })
        };
        Self::new(parse(lat)?, parse(lon)?)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
