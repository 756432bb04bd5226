//! Typed records of the evidence feeds.
//!
//! Provider payloads are parsed into explicit sub-structures. Only the fields
//! the engine reads are typed; everything else is kept verbatim in `extra`
//! so diagnostics can show the original lookup.

use std::collections::BTreeMap;

use geokyc_types::{ChainEpoch, Coordinate, TypesError};
use serde::{Deserialize, Serialize};

use crate::error::EvidenceError;

/// One observation of a miner advertising a multiaddr that resolves to `ip`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkEvidenceRecord {
    pub miner: String,
    #[serde(rename = "maddr", default)]
    pub multiaddr: String,
    #[serde(rename = "peerId", default)]
    pub peer_id: String,
    pub ip: String,
    pub epoch: ChainEpoch,
    #[serde(default)]
    pub timestamp: String,
    /// Seen through a DHT crawl.
    #[serde(rename = "dht", default)]
    pub dht_observed: bool,
    /// Seen in on-chain miner info.
    #[serde(rename = "chain", default)]
    pub chain_observed: bool,
}

// ── GeoLite2 ───────────────────────────────────────────────────────────

/// A GeoLite2 lookup for one IP.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiteFact {
    pub epoch: ChainEpoch,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub continent: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "subdiv1", default)]
    pub subdivision: String,
    #[serde(default)]
    pub city: String,
    #[serde(rename = "long")]
    pub lon: f64,
    pub lat: f64,
    #[serde(rename = "geolite2", default)]
    pub payload: LitePayload,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LitePayload {
    #[serde(default)]
    pub location: Option<LiteLocation>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiteLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LiteFact {
    /// Position of the IP: the raw lookup's `location` when present, otherwise
    /// the summary `lat`/`long` fields.
    pub fn coordinate(&self) -> Result<Coordinate, TypesError> {
        match &self.payload.location {
            Some(loc) => Coordinate::new(loc.latitude, loc.longitude),
            None => Coordinate::new(self.lat, self.lon),
        }
    }
}

// ── Baidu ──────────────────────────────────────────────────────────────

/// A Baidu IP-location lookup for one IP.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaiduFact {
    pub epoch: ChainEpoch,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub city: String,
    #[serde(rename = "long", default)]
    pub lon: f64,
    #[serde(default)]
    pub lat: f64,
    #[serde(rename = "baidu", default)]
    pub payload: BaiduPayload,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BaiduPayload {
    #[serde(default)]
    pub content: Option<BaiduContent>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaiduContent {
    #[serde(default)]
    pub point: Option<BaiduPoint>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Baidu reports positions as decimal strings: `x` is longitude, `y` latitude.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaiduPoint {
    pub x: String,
    pub y: String,
}

impl BaiduFact {
    /// Position from `content.point` of the raw lookup.
    pub fn coordinate(&self) -> Result<Coordinate, EvidenceError> {
        let point = self
            .payload
            .content
            .as_ref()
            .and_then(|c| c.point.as_ref())
            .ok_or(EvidenceError::MissingPoint)?;
        Ok(Coordinate::from_decimal_strings(&point.x, &point.y)?)
    }
}
