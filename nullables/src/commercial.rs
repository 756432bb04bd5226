//! Nullable commercial GeoIP: per-IP canned facts and injected failures.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use geokyc_providers::{CommercialLookup, ProviderError};
use geokyc_types::CommercialFact;

/// An in-memory commercial lookup.
///
/// Unknown IPs yield an empty fact, the same as a disabled client.
#[derive(Default)]
pub struct NullCommercial {
    facts: HashMap<String, CommercialFact>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl NullCommercial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the fact returned for `ip`.
    pub fn with_fact(mut self, ip: impl Into<String>, fact: CommercialFact) -> Self {
        self.facts.insert(ip.into(), fact);
        self
    }

    /// Make every lookup of `ip` fail.
    pub fn with_failure(mut self, ip: impl Into<String>) -> Self {
        self.failing.insert(ip.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CommercialLookup for NullCommercial {
    async fn lookup(&self, ip: &str) -> Result<CommercialFact, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(ip) {
            return Err(ProviderError::Unreachable(format!("lookup of {ip} failed")));
        }
        Ok(self.facts.get(ip).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_registered_fact_or_empty() {
        let fact = CommercialFact {
            country_code: "US".into(),
            ..CommercialFact::default()
        };
        let lookup = NullCommercial::new()
            .with_fact("198.51.100.1", fact.clone())
            .with_failure("198.51.100.2");

        assert_eq!(lookup.lookup("198.51.100.1").await.unwrap(), fact);
        assert!(lookup.lookup("198.51.100.2").await.is_err());
        assert_eq!(lookup.lookup("198.51.100.3").await.unwrap(), CommercialFact::default());
        assert_eq!(lookup.calls(), 3);
    }
}
