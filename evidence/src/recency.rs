//! Selects one miner's observations that are recent enough to trust.

use std::collections::BTreeSet;

use geokyc_types::{ChainEpoch, FRESHNESS_WINDOW_EPOCHS};
use serde::{Deserialize, Serialize};

use crate::facts::NetworkEvidenceRecord;
use crate::store::EvidenceStore;

/// An observation dropped because it is older than the freshness window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub ip: String,
    pub epoch: ChainEpoch,
    pub min_epoch: ChainEpoch,
}

/// The observations that survived filtering for one miner.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilteredEvidence {
    pub retained: Vec<NetworkEvidenceRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl FilteredEvidence {
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Distinct IPs of the retained observations, in sorted order.
    pub fn ips(&self) -> BTreeSet<&str> {
        self.retained.iter().map(|r| r.ip.as_str()).collect()
    }
}

/// Keeps observations of one miner no older than `window` epochs.
#[derive(Clone, Copy, Debug)]
pub struct RecencyFilter {
    window: u64,
}

impl RecencyFilter {
    pub fn new(window: u64) -> Self {
        Self { window }
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn filter(
        &self,
        store: &EvidenceStore,
        miner_id: &str,
        current: ChainEpoch,
    ) -> FilteredEvidence {
        let min_epoch = current.window_start(self.window);
        let mut out = FilteredEvidence::default();

        for record in store.observations().iter().filter(|r| r.miner == miner_id) {
            if current.retains(record.epoch, self.window) {
                out.retained.push(record.clone());
            } else {
                tracing::info!(
                    miner = miner_id,
                    ip = %record.ip,
                    epoch = %record.epoch,
                    min_epoch = %min_epoch,
                    "IP address rejected, too old"
                );
                out.rejected.push(RejectedRecord {
                    ip: record.ip.clone(),
                    epoch: record.epoch,
                    min_epoch,
                });
            }
        }

        if out.retained.is_empty() {
            tracing::info!(miner = miner_id, "no recent multiaddrs/IPs found");
        }
        out
    }
}

impl Default for RecencyFilter {
    fn default() -> Self {
        Self::new(FRESHNESS_WINDOW_EPOCHS)
    }
}
