//! Google Geocoding API client: turns a claimed "city, country" into reference coordinates.

use geokyc_types::{Address, Coordinate, ReferenceCoordinate};
use serde::Deserialize;

use crate::http::{check_status, map_send_error, with_retry, HttpSettings};
use crate::{Geocoder, ProviderError, SKIP_SENTINEL};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

// ── Wire format ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// One component of a geocoded address.
#[derive(Clone, Debug, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    fn has_type(&self, t: &str) -> bool {
        self.types.iter().any(|x| x == t)
    }
}

/// Build a structured [`Address`] from geocoder components.
///
/// US addresses use the state abbreviation and get a `"City, ST"` city_state;
/// elsewhere the state is the long name and city_state is the city.
pub fn address_from_components(components: &[AddressComponent]) -> Address {
    let mut address = Address::default();
    if let Some(country) = components.iter().find(|c| c.has_type("country")) {
        address.country = country.short_name.clone();
    }
    let is_us = address.country == "US";

    for c in components {
        if c.has_type("street_number") {
            address.street_number = c.long_name.clone();
        } else if c.has_type("route") {
            address.route = c.long_name.clone();
        } else if c.has_type("locality") {
            address.city = c.long_name.clone();
        } else if c.has_type("administrative_area_level_1") {
            address.state = if is_us {
                c.short_name.clone()
            } else {
                c.long_name.clone()
            };
        }
    }

    address.city_state = if is_us && !address.city.is_empty() && !address.state.is_empty() {
        format!("{}, {}", address.city, address.state)
    } else {
        address.city.clone()
    };
    address
}

// ── Client ─────────────────────────────────────────────────────────────

/// Geocoder backed by the Google Maps Geocoding API.
pub struct GoogleGeocoder {
    http_client: reqwest::Client,
    base_url: String,
    settings: HttpSettings,
    /// `None` when disabled (no key, or the `skip` sentinel).
    api_key: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(api_key: Option<&str>, settings: HttpSettings) -> Result<Self, ProviderError> {
        let api_key = match api_key.map(str::trim) {
            None | Some("") => {
                tracing::warn!("GOOGLE_MAPS_API_KEY not set: geocoding disabled");
                None
            }
            Some(SKIP_SENTINEL) => {
                tracing::warn!("GOOGLE_MAPS_API_KEY set to '{SKIP_SENTINEL}': geocoding disabled");
                None
            }
            Some(key) => Some(key.to_string()),
        };
        Ok(Self {
            http_client: settings.build_client()?,
            base_url: GEOCODE_URL.to_string(),
            settings,
            api_key,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch(&self, query: &str, key: &str) -> Result<Vec<ReferenceCoordinate>, ProviderError> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("address", query), ("key", key)])
            .send()
            .await
            .map_err(map_send_error)?;
        let response = check_status(response).await?;
        let body: GeocodeResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse geocode response: {e}"))
        })?;
        parse_results(body)
    }
}

fn parse_results(body: GeocodeResponse) -> Result<Vec<ReferenceCoordinate>, ProviderError> {
    match body.status.as_str() {
        "OK" | "ZERO_RESULTS" => {}
        "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR" => {
            // Google reports throttling and server hiccups inside a 200 response.
            return Err(ProviderError::Status {
                status: 503,
                body: body.status,
            });
        }
        other => {
            let detail = body.error_message.unwrap_or_default();
            return Err(ProviderError::Rejected(format!("{other} {detail}").trim().to_string()));
        }
    }

    body.results
        .into_iter()
        .map(|r| {
            let coordinate = Coordinate::new(r.geometry.location.lat, r.geometry.location.lng)
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
            Ok(ReferenceCoordinate {
                coordinate,
                address: address_from_components(&r.address_components),
            })
        })
        .collect()
}

impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<ReferenceCoordinate>, ProviderError> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };
        with_retry(&self.settings.retry, "google geocode", || self.fetch(query, key)).await
    }
}
