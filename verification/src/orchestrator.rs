//! Geo-match orchestrator: connects recency filtering, tier resolution,
//! geocoding and the match cascade into one validation run.

use geokyc_evidence::{EvidenceStore, RecencyFilter};
use geokyc_providers::{CommercialLookup, Geocoder};
use geokyc_types::{ChainEpoch, ClaimedLocation, FRESHNESS_WINDOW_EPOCHS};

use crate::cascade::MatchCascade;
use crate::error::VerificationError;
use crate::matcher::{MatchContext, DEFAULT_MAX_DISTANCE_KM};
use crate::outcome::{MatchDiagnostics, MatchResult};
use crate::resolver::{TierResolver, DEFAULT_MAX_CONCURRENT_LOOKUPS};

/// Tunables for a geo-matching run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchSettings {
    pub max_distance_km: f64,
    pub freshness_window_epochs: u64,
    pub max_concurrent_lookups: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            freshness_window_epochs: FRESHNESS_WINDOW_EPOCHS,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }
}

/// Runs the full geo-match for one claim at a time.
///
/// Holds no per-request state; one instance can serve any number of runs.
pub struct GeoMatchOrchestrator<G, C> {
    geocoder: G,
    commercial: C,
    cascade: MatchCascade,
    settings: MatchSettings,
}

impl<G: Geocoder, C: CommercialLookup> GeoMatchOrchestrator<G, C> {
    pub fn new(geocoder: G, commercial: C) -> Self {
        Self {
            geocoder,
            commercial,
            cascade: MatchCascade::default(),
            settings: MatchSettings::default(),
        }
    }

    pub fn with_cascade(mut self, cascade: MatchCascade) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn with_settings(mut self, settings: MatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn commercial(&self) -> &C {
        &self.commercial
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Decide whether `claim` is backed by recent network evidence.
    ///
    /// A miner without recent evidence fails without contacting the geocoder.
    /// Geocoder failure is returned as an error; everything else degrades
    /// into diagnostics.
    pub async fn verify(
        &self,
        store: &EvidenceStore,
        claim: &ClaimedLocation,
        current: ChainEpoch,
    ) -> Result<MatchResult, VerificationError> {
        let claim = claim.normalized();
        tracing::info!(
            miner = %claim.miner_id,
            city = %claim.city,
            country = %claim.country_code,
            epoch = %current,
            "searching for geo matches"
        );

        let filtered = RecencyFilter::new(self.settings.freshness_window_epochs).filter(
            store,
            &claim.miner_id,
            current,
        );
        let mut diagnostics = MatchDiagnostics {
            rejected_evidence: filtered.rejected.clone(),
            filtered_evidence: filtered.retained.clone(),
            ..MatchDiagnostics::default()
        };

        if filtered.is_empty() {
            return Ok(MatchResult {
                matched: false,
                diagnostics,
            });
        }

        let query = claim.geocode_query();
        let resolver = TierResolver::new(self.settings.max_concurrent_lookups);
        let (references, facts) = tokio::join!(
            self.geocoder.geocode(&query),
            resolver.resolve(store, &filtered, &self.commercial),
        );
        let references = references.map_err(VerificationError::Geocode)?;
        tracing::info!(query = %query, results = references.len(), "geocoded claim");

        diagnostics.reference_coordinates = references.iter().map(|r| r.coordinate).collect();
        diagnostics.resolved_addresses = references.iter().map(|r| r.address.clone()).collect();
        diagnostics.commercial_failures = facts.commercial_failures.clone();

        let ctx = MatchContext {
            claim: &claim,
            references: &references,
            max_distance_km: self.settings.max_distance_km,
        };
        let outcome = self.cascade.run(&facts, &ctx);
        diagnostics.tier_verdicts = outcome.verdicts;
        diagnostics.matched_tier = outcome.matched_tier;

        Ok(MatchResult {
            matched: outcome.matched,
            diagnostics,
        })
    }
}
