//! MaxMind GeoIP2 Insights web service client (the commercial evidence tier).

use std::collections::BTreeMap;

use geokyc_types::{CommercialFact, Coordinate};
use serde::Deserialize;

use crate::http::{check_status, map_send_error, with_retry, HttpSettings};
use crate::{CommercialLookup, ProviderError, SKIP_SENTINEL};

/// Default Insights endpoint.
const MAXMIND_INSIGHTS_URL: &str = "https://geoip.maxmind.com/geoip/v2.1/insights";

// ── Wire format ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct InsightsResponse {
    #[serde(default)]
    country: Option<InsightsCountry>,
    #[serde(default)]
    city: Option<InsightsCity>,
    #[serde(default)]
    location: Option<InsightsLocation>,
}

#[derive(Debug, Deserialize)]
struct InsightsCountry {
    #[serde(default)]
    iso_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsightsCity {
    #[serde(default)]
    names: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct InsightsLocation {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl From<InsightsResponse> for CommercialFact {
    fn from(resp: InsightsResponse) -> Self {
        let coordinate = resp.location.and_then(|loc| match (loc.latitude, loc.longitude) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon).ok(),
            _ => None,
        });
        CommercialFact {
            country_code: resp.country.and_then(|c| c.iso_code).unwrap_or_default(),
            city_names: resp.city.map(|c| c.names).unwrap_or_default(),
            coordinate,
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────────

enum Mode {
    Enabled {
        account_id: String,
        license_key: String,
    },
    /// Credentials set to the sentinel: every lookup yields an empty fact.
    Disabled,
}

/// Client for per-IP commercial GeoIP lookups.
pub struct MaxMindClient {
    http_client: reqwest::Client,
    base_url: String,
    settings: HttpSettings,
    mode: Mode,
}

impl MaxMindClient {
    /// Create a client from an account id / license key pair.
    ///
    /// If either credential is the `skip` sentinel the client is disabled.
    /// An absent credential is an error for the caller to handle.
    pub fn new(
        account_id: &str,
        license_key: &str,
        settings: HttpSettings,
    ) -> Result<Self, ProviderError> {
        let mode = if account_id == SKIP_SENTINEL || license_key == SKIP_SENTINEL {
            tracing::warn!("skipping MaxMind GeoIP2 lookups: credentials set to '{SKIP_SENTINEL}'");
            Mode::Disabled
        } else if account_id.is_empty() {
            return Err(ProviderError::MissingCredential("MAXMIND_USER_ID"));
        } else if license_key.is_empty() {
            return Err(ProviderError::MissingCredential("MAXMIND_LICENSE_KEY"));
        } else {
            Mode::Enabled {
                account_id: account_id.to_string(),
                license_key: license_key.to_string(),
            }
        };
        Ok(Self {
            http_client: settings.build_client()?,
            base_url: MAXMIND_INSIGHTS_URL.to_string(),
            settings,
            mode,
        })
    }

    /// A client that never contacts the service.
    pub fn disabled() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: MAXMIND_INSIGHTS_URL.to_string(),
            settings: HttpSettings::default(),
            mode: Mode::Disabled,
        }
    }

    /// Point the client at a different endpoint (e.g. a regional mirror).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.mode, Mode::Enabled { .. })
    }

    async fn fetch(
        &self,
        ip: &str,
        account_id: &str,
        license_key: &str,
    ) -> Result<CommercialFact, ProviderError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ip);
        let response = self
            .http_client
            .get(&url)
            .basic_auth(account_id, Some(license_key))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(map_send_error)?;
        let response = check_status(response).await?;
        let body: InsightsResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse GeoIP2 response: {e}"))
        })?;
        Ok(body.into())
    }
}

impl CommercialLookup for MaxMindClient {
    async fn lookup(&self, ip: &str) -> Result<CommercialFact, ProviderError> {
        match &self.mode {
            Mode::Disabled => Ok(CommercialFact::default()),
            Mode::Enabled {
                account_id,
                license_key,
            } => {
                with_retry(&self.settings.retry, "maxmind insights", || {
                    self.fetch(ip, account_id, license_key)
                })
                .await
            }
        }
    }
}
