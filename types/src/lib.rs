//! Fundamental types for geokyc.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! coordinates, chain epochs, claimed locations and the structured addresses
//! produced by geocoding.

pub mod address;
pub mod claim;
pub mod commercial;
pub mod coordinate;
pub mod epoch;
pub mod error;

pub use address::{Address, NormalizedLocation, ReferenceCoordinate};
pub use claim::{normalize_country_code, ClaimedLocation};
pub use commercial::CommercialFact;
pub use coordinate::Coordinate;
pub use epoch::{ChainEpoch, FRESHNESS_WINDOW_EPOCHS};
pub use error::TypesError;
