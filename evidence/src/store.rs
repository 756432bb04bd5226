//! Immutable, pre-loaded evidence tables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EvidenceError;
use crate::facts::{BaiduFact, LiteFact, NetworkEvidenceRecord};

/// Locations of the three snapshot files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidencePaths {
    pub multiaddrs_ips: PathBuf,
    pub ips_geolite2: PathBuf,
    pub ips_baidu: PathBuf,
}

impl Default for EvidencePaths {
    fn default() -> Self {
        Self {
            multiaddrs_ips: PathBuf::from("testdata/multiaddrs-ips-latest.json"),
            ips_geolite2: PathBuf::from("testdata/ips-geolite2-latest.json"),
            ips_baidu: PathBuf::from("testdata/ips-baidu-latest.json"),
        }
    }
}

// ── File envelopes ─────────────────────────────────────────────────────
//
// Envelopes are strict. Records stay untyped until `typed_records` /
// `typed_facts` convert them one by one, so a badly shaped record drops only
// itself.

#[derive(Deserialize)]
struct MultiaddrsIpsReport {
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "multiaddrsIps", alias = "multiaddrsIPs", alias = "MultiaddrsIPs")]
    records: Vec<Value>,
}

#[derive(Deserialize)]
struct IpsGeolite2Report {
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "ipsGeolite2")]
    ips: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct IpsBaiduReport {
    #[serde(default)]
    date: Option<String>,
    #[serde(rename = "ipsBaidu")]
    ips: HashMap<String, Value>,
}

// ── Store ──────────────────────────────────────────────────────────────

/// Evidence snapshot shared read-only by every validation run.
#[derive(Clone, Debug, Default)]
pub struct EvidenceStore {
    observations: Vec<NetworkEvidenceRecord>,
    geolite2: HashMap<String, LiteFact>,
    baidu: HashMap<String, BaiduFact>,
}

impl EvidenceStore {
    pub fn new(
        observations: Vec<NetworkEvidenceRecord>,
        geolite2: HashMap<String, LiteFact>,
        baidu: HashMap<String, BaiduFact>,
    ) -> Self {
        Self {
            observations,
            geolite2,
            baidu,
        }
    }

    /// Load all three snapshots.
    ///
    /// A missing file, invalid JSON or a wrong envelope is an error. A single
    /// record that does not fit its typed shape is logged and left out.
    pub fn load(paths: &EvidencePaths) -> Result<Self, EvidenceError> {
        let observations: MultiaddrsIpsReport = read_json(&paths.multiaddrs_ips)?;
        let geolite2: IpsGeolite2Report = read_json(&paths.ips_geolite2)?;
        let baidu: IpsBaiduReport = read_json(&paths.ips_baidu)?;

        let records = typed_records(&paths.multiaddrs_ips, observations.records);
        let lite: HashMap<String, LiteFact> = typed_facts(&paths.ips_geolite2, geolite2.ips);
        let baidu_facts: HashMap<String, BaiduFact> = typed_facts(&paths.ips_baidu, baidu.ips);

        tracing::info!(
            observations = records.len(),
            observations_date = observations.date.as_deref().unwrap_or("-"),
            geolite2 = lite.len(),
            geolite2_date = geolite2.date.as_deref().unwrap_or("-"),
            baidu = baidu_facts.len(),
            baidu_date = baidu.date.as_deref().unwrap_or("-"),
            "loaded evidence snapshots"
        );

        Ok(Self::new(records, lite, baidu_facts))
    }

    pub fn observations(&self) -> &[NetworkEvidenceRecord] {
        &self.observations
    }

    pub fn lite_fact(&self, ip: &str) -> Option<&LiteFact> {
        self.geolite2.get(ip)
    }

    pub fn baidu_fact(&self, ip: &str) -> Option<&BaiduFact> {
        self.baidu.get(ip)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, EvidenceError> {
    let bytes = std::fs::read(path).map_err(|source| EvidenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| EvidenceError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn typed_records(path: &Path, records: Vec<Value>) -> Vec<NetworkEvidenceRecord> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), index, "skipping malformed observation: {e}");
                None
            }
        })
        .collect()
}

fn typed_facts<T: DeserializeOwned>(
    path: &Path,
    entries: HashMap<String, Value>,
) -> HashMap<String, T> {
    entries
        .into_iter()
        .filter_map(|(ip, value)| match serde_json::from_value(value) {
            Ok(fact) => Some((ip, fact)),
            Err(e) => {
                tracing::warn!(path = %path.display(), ip = %ip, "skipping malformed lookup: {e}");
                None
            }
        })
        .collect()
}
