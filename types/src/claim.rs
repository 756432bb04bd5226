//! The location a storage provider declares for itself.

use serde::{Deserialize, Serialize};

/// Free-text country values seen in submissions, mapped to ISO codes.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("united states", "US"),
    ("san jose, ca", "US"),
    ("canada", "CA"),
];

/// A miner's self-declared city and country.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedLocation {
    pub miner_id: String,
    pub city: String,
    pub country_code: String,
}

impl ClaimedLocation {
    pub fn new(
        miner_id: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            miner_id: miner_id.into(),
            city: city.into(),
            country_code: country_code.into(),
        }
    }

    /// Return a copy with the country rewritten to an upper-case ISO code.
    ///
    /// The city is kept verbatim; matchers decide how strictly to compare it.
    pub fn normalized(&self) -> Self {
        Self {
            miner_id: self.miner_id.clone(),
            city: self.city.clone(),
            country_code: normalize_country_code(&self.country_code),
        }
    }

    /// The free-text query sent to the geocoder.
    pub fn geocode_query(&self) -> String {
        format!("{}, {}", self.city, self.country_code)
    }
}

/// Normalize a submitted country value.
///
/// Known aliases match case-insensitively; anything else is upper-cased.
/// Applying this twice gives the same result as applying it once.
pub fn normalize_country_code(raw: &str) -> String {
    let trimmed = raw.trim();
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|(_, code)| (*code).to_string())
        .unwrap_or_else(|| trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_rewrite_to_iso_codes() {
        assert_eq!(normalize_country_code("United States"), "US");
        assert_eq!(normalize_country_code("San Jose, CA"), "US");
        assert_eq!(normalize_country_code("Canada"), "CA");
        assert_eq!(normalize_country_code("canada"), "CA");
        assert_eq!(normalize_country_code("CA"), "CA");
    }

    #[test]
    fn plain_codes_are_upper_cased() {
        assert_eq!(normalize_country_code("cn"), "CN");
        assert_eq!(normalize_country_code(" pl "), "PL");
    }

    #[test]
    fn normalized_claim_keeps_city_verbatim() {
        let claim = ClaimedLocation::new("f01012", "hangzhou", "cn").normalized();
        assert_eq!(claim.city, "hangzhou");
        assert_eq!(claim.country_code, "CN");
        assert_eq!(claim.geocode_query(), "hangzhou, CN");
    }
}
