//! Evidence snapshots consumed by the geo-matching engine.
//!
//! Three JSON feeds are produced by an external ingestion pipeline:
//! - miner ↔ IP observations (which multiaddrs each miner has broadcast),
//! - GeoLite2 lookups keyed by IP,
//! - Baidu lookups keyed by IP (meaningful for Chinese addresses only).
//!
//! They are loaded once into an immutable [`EvidenceStore`]. Per request, the
//! [`RecencyFilter`] selects one miner's recent observations.

pub mod error;
pub mod facts;
pub mod recency;
pub mod store;

pub use error::EvidenceError;
pub use facts::{
    BaiduContent, BaiduFact, BaiduPayload, BaiduPoint, LiteFact, LiteLocation, LitePayload,
    NetworkEvidenceRecord,
};
pub use recency::{FilteredEvidence, RecencyFilter, RejectedRecord};
pub use store::{EvidencePaths, EvidenceStore};
