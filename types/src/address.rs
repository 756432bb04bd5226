//! Structured addresses returned by geocoding and the location record
//! emitted for a verified miner.

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// A geocoded address broken into the components used downstream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_number: String,
    pub route: String,
    pub city: String,
    pub state: String,
    /// `"City, ST"` for US addresses, the plain city elsewhere.
    pub city_state: String,
    /// ISO 3166-1 alpha-2 code.
    pub country: String,
}

/// The verified location recorded for a miner once all checks pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLocation {
    pub loc_city: String,
    pub loc_country: String,
    pub loc_continent: String,
}

/// One geocoding result for a claimed location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCoordinate {
    pub coordinate: Coordinate,
    pub address: Address,
}
