//! Result of a commercial GeoIP lookup for one IP.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Coordinate;

/// What the commercial GeoIP service knows about an IP.
///
/// An all-empty value is what a disabled lookup returns: its country is blank,
/// so it never passes a country comparison.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CommercialFact {
    pub country_code: String,
    /// City name per locale (`"en"`, `"de"`, ...). Often empty.
    pub city_names: BTreeMap<String, String>,
    pub coordinate: Option<Coordinate>,
}

impl CommercialFact {
    /// Whether no locale carries a non-empty city name.
    pub fn has_no_city(&self) -> bool {
        self.city_names.values().all(|name| name.is_empty())
    }

    /// The English city name, or an empty string.
    pub fn english_city(&self) -> &str {
        self.city_names.get("en").map(String::as_str).unwrap_or("")
    }
}
