//! Nullable geocoder: fixed reference coordinates, counted calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use geokyc_providers::{Geocoder, ProviderError};
use geokyc_types::{Address, Coordinate, ReferenceCoordinate};

/// A geocoder that answers every query with the same configured result.
pub struct NullGeocoder {
    results: Vec<ReferenceCoordinate>,
    failure: Option<String>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl NullGeocoder {
    /// Answer every query with `results`.
    pub fn new(results: Vec<ReferenceCoordinate>) -> Self {
        Self {
            results,
            failure: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// A geocoder that knows nothing (zero results for every query).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A geocoder whose every call fails with a non-transient rejection.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::empty()
        }
    }

    /// One reference point with the given city and country.
    pub fn at(lat: f64, lon: f64, city: &str, country: &str) -> Self {
        Self::new(vec![reference(lat, lon, city, country)])
    }

    /// How many times `geocode` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Default for NullGeocoder {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build a reference coordinate whose address carries only a city and country.
///
/// Panics if the coordinate is out of range; intended for test fixtures.
pub fn reference(lat: f64, lon: f64, city: &str, country: &str) -> ReferenceCoordinate {
    let coordinate = match Coordinate::new(lat, lon) {
        Ok(c) => c,
        Err(e) => panic!("invalid fixture coordinate: {e}"),
    };
    ReferenceCoordinate {
        coordinate,
        address: Address {
            city: city.to_string(),
            city_state: city.to_string(),
            country: country.to_string(),
            ..Address::default()
        },
    }
}

impl Geocoder for NullGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<ReferenceCoordinate>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        match &self.failure {
            Some(message) => Err(ProviderError::Rejected(message.clone())),
            None => Ok(self.results.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_calls_and_records_queries() {
        let geocoder = NullGeocoder::at(45.0, -75.0, "Ottawa", "CA");
        assert_eq!(geocoder.calls(), 0);
        let refs = geocoder.geocode("Ottawa, CA").await.unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].address.city, "Ottawa");
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(geocoder.queries(), vec!["Ottawa, CA".to_string()]);
    }

    #[tokio::test]
    async fn failing_geocoder_errors() {
        let geocoder = NullGeocoder::failing("REQUEST_DENIED");
        assert!(geocoder.geocode("anywhere").await.is_err());
        assert_eq!(geocoder.calls(), 1);
    }
}
