//! External collaborators of the geo-matching engine.
//!
//! Each collaborator is a trait so the engine can be driven by the real HTTPS
//! clients in production and by in-memory doubles in tests:
//! - [`CommercialLookup`]: per-IP commercial GeoIP facts ([`MaxMindClient`]),
//! - [`Geocoder`]: claimed "city, country" → reference coordinates ([`GoogleGeocoder`]),
//! - [`ChainSource`]: current chain height and miner power ([`LotusClient`]).
//!
//! Every client carries an explicit timeout and a bounded retry policy
//! ([`HttpSettings`]). All calls are cancellable by dropping the future.

use std::future::Future;

use geokyc_types::{ChainEpoch, CommercialFact, ReferenceCoordinate};

pub mod error;
pub mod google;
pub mod http;
pub mod lotus;
pub mod maxmind;

pub use error::ProviderError;
pub use google::{address_from_components, AddressComponent, GoogleGeocoder};
pub use http::{with_retry, HttpSettings, RetryPolicy};
pub use lotus::{LotusClient, DEFAULT_LOTUS_URL};
pub use maxmind::MaxMindClient;

/// Credential value that switches a provider off without an error.
pub const SKIP_SENTINEL: &str = "skip";

/// On-demand commercial GeoIP lookup for a single IP.
pub trait CommercialLookup: Send + Sync {
    /// Look up `ip`. A disabled provider returns an empty fact, not an error.
    fn lookup(&self, ip: &str) -> impl Future<Output = Result<CommercialFact, ProviderError>> + Send;
}

/// Forward geocoding of a free-text address.
pub trait Geocoder: Send + Sync {
    /// Zero results is a valid answer.
    fn geocode(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<ReferenceCoordinate>, ProviderError>> + Send;
}

/// Read-only chain state.
pub trait ChainSource: Send + Sync {
    fn current_epoch(&self) -> impl Future<Output = Result<ChainEpoch, ProviderError>> + Send;

    /// Quality-adjusted power of `miner_id`, in bytes.
    fn miner_power(&self, miner_id: &str)
        -> impl Future<Output = Result<u128, ProviderError>> + Send;
}
