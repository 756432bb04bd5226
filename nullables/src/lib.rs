//! Nullable infrastructure for deterministic testing.
//!
//! Every external service the validator talks to (geocoder, commercial GeoIP,
//! Filecoin chain) sits behind a trait in `geokyc-providers`. This crate
//! provides test-friendly implementations that:
//! - Return pre-configured values
//! - Count the calls they receive so tests can assert on them
//! - Never touch the network
//!
//! Usage: swap real clients for nullables in tests.

pub mod chain;
pub mod commercial;
pub mod geocoder;

pub use chain::NullChain;
pub use commercial::NullCommercial;
pub use geocoder::{reference, NullGeocoder};
