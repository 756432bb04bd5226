//! Joins each retained IP to the facts every evidence tier holds for it.

use std::collections::BTreeMap;

use futures_util::stream::{self, StreamExt};
use geokyc_evidence::{BaiduFact, EvidenceStore, FilteredEvidence, LiteFact};
use geokyc_providers::CommercialLookup;
use geokyc_types::CommercialFact;
use serde::Serialize;

/// Default number of commercial lookups in flight at once.
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Per-tier facts for one request, keyed by IP.
///
/// Maps are ordered so tier scans and their logs are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResolvedFacts {
    pub baidu: BTreeMap<String, BaiduFact>,
    pub lite: BTreeMap<String, LiteFact>,
    pub commercial: BTreeMap<String, CommercialFact>,
    /// IPs whose commercial lookup failed, with the error text.
    pub commercial_failures: BTreeMap<String, String>,
}

/// Resolves tier facts for a filtered IP set.
#[derive(Clone, Copy, Debug)]
pub struct TierResolver {
    max_concurrent: usize,
}

impl TierResolver {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Look up static facts directly and query the commercial tier per IP.
    ///
    /// A failed commercial lookup is recorded and skipped; it never aborts
    /// resolution of the other IPs.
    pub async fn resolve<C: CommercialLookup>(
        &self,
        store: &EvidenceStore,
        filtered: &FilteredEvidence,
        commercial: &C,
    ) -> ResolvedFacts {
        let ips: Vec<String> = filtered.ips().into_iter().map(str::to_string).collect();
        let mut facts = ResolvedFacts::default();

        for ip in &ips {
            if let Some(fact) = store.baidu_fact(ip) {
                facts.baidu.insert(ip.clone(), fact.clone());
            }
            if let Some(fact) = store.lite_fact(ip) {
                facts.lite.insert(ip.clone(), fact.clone());
            }
        }

        let lookups: Vec<_> = stream::iter(ips)
            .map(|ip| async move {
                let result = commercial.lookup(&ip).await;
                (ip, result)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        for (ip, result) in lookups {
            match result {
                Ok(fact) => {
                    facts.commercial.insert(ip, fact);
                }
                Err(e) => {
                    tracing::warn!(ip = %ip, "commercial lookup failed, skipping IP: {e}");
                    facts.commercial_failures.insert(ip, e.to_string());
                }
            }
        }

        tracing::debug!(
            baidu = facts.baidu.len(),
            geolite = facts.lite.len(),
            commercial = facts.commercial.len(),
            failures = facts.commercial_failures.len(),
            "resolved tier facts"
        );
        facts
    }
}

impl Default for TierResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_LOOKUPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geokyc_evidence::{LitePayload, NetworkEvidenceRecord, RecencyFilter};
    use geokyc_nullables::NullCommercial;
    use geokyc_types::ChainEpoch;
    use std::collections::HashMap;

    fn record(ip: &str) -> NetworkEvidenceRecord {
        NetworkEvidenceRecord {
            miner: "f01000".into(),
            multiaddr: format!("/ip4/{ip}/tcp/24001"),
            peer_id: "12D3KooW".into(),
            ip: ip.into(),
            epoch: ChainEpoch::new(1_000_000),
            timestamp: String::new(),
            dht_observed: true,
            chain_observed: true,
        }
    }

    fn lite(country: &str, city: &str) -> LiteFact {
        LiteFact {
            epoch: ChainEpoch::new(1_000_000),
            timestamp: String::new(),
            continent: "EU".into(),
            country: country.into(),
            subdivision: String::new(),
            city: city.into(),
            lon: 21.0,
            lat: 52.2,
            payload: LitePayload::default(),
        }
    }

    fn filtered(store: &EvidenceStore) -> FilteredEvidence {
        RecencyFilter::default().filter(store, "f01000", ChainEpoch::new(1_000_000))
    }

    #[tokio::test]
    async fn joins_static_and_commercial_facts() {
        let mut geolite = HashMap::new();
        geolite.insert("192.0.2.1".to_string(), lite("PL", "Warsaw"));
        let store = EvidenceStore::new(
            vec![record("192.0.2.1"), record("192.0.2.2"), record("192.0.2.1")],
            geolite,
            HashMap::new(),
        );
        let commercial = NullCommercial::new().with_fact(
            "192.0.2.2",
            CommercialFact {
                country_code: "PL".into(),
                ..CommercialFact::default()
            },
        );

        let facts = TierResolver::default()
            .resolve(&store, &filtered(&store), &commercial)
            .await;

        assert_eq!(facts.lite.len(), 1);
        assert!(facts.baidu.is_empty());
        assert_eq!(facts.commercial.len(), 2);
        assert_eq!(facts.commercial["192.0.2.2"].country_code, "PL");
        // Duplicate observations of one IP are looked up once.
        assert_eq!(commercial.calls(), 2);
    }

    #[tokio::test]
    async fn commercial_failure_skips_only_that_ip() {
        let store = EvidenceStore::new(
            vec![record("192.0.2.1"), record("192.0.2.2")],
            HashMap::new(),
            HashMap::new(),
        );
        let commercial = NullCommercial::new().with_failure("192.0.2.1");

        let facts = TierResolver::new(1)
            .resolve(&store, &filtered(&store), &commercial)
            .await;

        assert!(facts.commercial.contains_key("192.0.2.2"));
        assert!(!facts.commercial.contains_key("192.0.2.1"));
        assert!(facts.commercial_failures.contains_key("192.0.2.1"));
    }
}
