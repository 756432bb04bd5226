use std::collections::HashMap;

use proptest::prelude::*;

use geokyc_evidence::{EvidenceStore, NetworkEvidenceRecord, RecencyFilter};
use geokyc_types::{ChainEpoch, FRESHNESS_WINDOW_EPOCHS};

fn record(miner: u8, ip: u8, epoch: u64) -> NetworkEvidenceRecord {
    NetworkEvidenceRecord {
        miner: format!("f0{miner}"),
        multiaddr: String::new(),
        peer_id: String::new(),
        ip: format!("10.0.0.{ip}"),
        epoch: ChainEpoch::new(epoch),
        timestamp: String::new(),
        dht_observed: false,
        chain_observed: true,
    }
}

proptest! {
    /// Retained records are all fresh and belong to the miner; stale ones are all reported.
    #[test]
    fn recency_invariant_holds(
        now in 0u64..3_000_000,
        entries in prop::collection::vec((0u8..3, 0u8..20, 0u64..3_000_000), 0..40),
    ) {
        let records: Vec<_> = entries.iter().map(|&(m, ip, e)| record(m, ip, e)).collect();
        let store = EvidenceStore::new(records.clone(), HashMap::new(), HashMap::new());
        let current = ChainEpoch::new(now);
        let min = now as i128 - FRESHNESS_WINDOW_EPOCHS as i128;

        let out = RecencyFilter::default().filter(&store, "f01", current);

        for r in &out.retained {
            prop_assert_eq!(r.miner.as_str(), "f01");
            prop_assert!(r.epoch.as_u64() as i128 >= min);
        }
        for r in &out.rejected {
            prop_assert!((r.epoch.as_u64() as i128) < min);
        }
        let expected = records.iter().filter(|r| r.miner == "f01").count();
        prop_assert_eq!(out.retained.len() + out.rejected.len(), expected);
    }
}
