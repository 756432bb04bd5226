use proptest::prelude::*;

use geokyc_types::{normalize_country_code, ChainEpoch, Coordinate, FRESHNESS_WINDOW_EPOCHS};

proptest! {
    /// Normalizing an already-normalized value changes nothing.
    #[test]
    fn country_normalization_is_idempotent(raw in "[A-Za-z ,]{0,20}") {
        let once = normalize_country_code(&raw);
        let twice = normalize_country_code(&once);
        prop_assert_eq!(once, twice);
    }

    /// Case never affects the normalized code.
    #[test]
    fn country_normalization_ignores_case(raw in "[A-Za-z]{2}") {
        prop_assert_eq!(
            normalize_country_code(&raw.to_lowercase()),
            normalize_country_code(&raw.to_uppercase())
        );
    }

    /// Every retained epoch is at or after the window start; every dropped one is before it.
    #[test]
    fn retention_matches_window_start(now in 0u64..10_000_000, observed in 0u64..10_000_000) {
        let now = ChainEpoch::new(now);
        let observed = ChainEpoch::new(observed);
        let min = now.as_u64() as i128 - FRESHNESS_WINDOW_EPOCHS as i128;
        prop_assert_eq!(
            now.retains(observed, FRESHNESS_WINDOW_EPOCHS),
            observed.as_u64() as i128 >= min
        );
    }

    /// Any in-range pair of degrees is accepted.
    #[test]
    fn in_range_coordinates_are_valid(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
        let c = Coordinate::new(lat, lon).unwrap();
        prop_assert_eq!(c.lat, lat);
        prop_assert_eq!(c.lon, lon);
    }
}

#[test]
fn alias_spellings_agree() {
    for raw in ["Canada", "canada", "CANADA", "CA", "ca"] {
        assert_eq!(normalize_country_code(raw), "CA", "input {raw:?}");
    }
    for raw in ["United States", "united states", "San Jose, CA", "US"] {
        assert_eq!(normalize_country_code(raw), "US", "input {raw:?}");
    }
}
