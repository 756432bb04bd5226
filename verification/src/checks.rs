//! KYC checks run against a miner's submission, in an explicit order.
//!
//! The caller builds the list; nothing registers itself globally.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use geokyc_evidence::{EvidencePaths, EvidenceStore};
use geokyc_providers::{ChainSource, CommercialLookup, Geocoder};
use geokyc_types::{ChainEpoch, ClaimedLocation, NormalizedLocation};
use serde::Serialize;

use crate::continents::continent_for;
use crate::error::VerificationError;
use crate::orchestrator::GeoMatchOrchestrator;
use crate::outcome::MatchResult;

/// 10 TiB of quality-adjusted power.
pub const DEFAULT_MIN_POWER_BYTES: u128 = 10 * (1 << 40);

/// The result of one check.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<NormalizedLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_match: Option<MatchResult>,
}

impl CheckOutcome {
    fn new(name: &str, passed: bool, detail: String) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail,
            location: None,
            geo_match: None,
        }
    }
}

/// A single gate in the KYC pipeline.
///
/// A failed check is an `Ok` outcome with `passed == false`; `Err` means the
/// check could not be carried out.
pub trait KycCheck: Send + Sync {
    fn name(&self) -> &str;

    fn run<'a>(
        &'a self,
        claim: &'a ClaimedLocation,
    ) -> BoxFuture<'a, Result<CheckOutcome, VerificationError>>;
}

// ── Minimum power ──────────────────────────────────────────────────────

/// Requires a minimum quality-adjusted storage power.
pub struct MinPowerCheck<S> {
    chain: Arc<S>,
    min_power: u128,
}

impl<S: ChainSource> MinPowerCheck<S> {
    pub fn new(chain: Arc<S>, min_power: u128) -> Self {
        Self { chain, min_power }
    }
}

impl<S: ChainSource> KycCheck for MinPowerCheck<S> {
    fn name(&self) -> &str {
        "min_power"
    }

    fn run<'a>(
        &'a self,
        claim: &'a ClaimedLocation,
    ) -> BoxFuture<'a, Result<CheckOutcome, VerificationError>> {
        Box::pin(async move {
            let power = self
                .chain
                .miner_power(&claim.miner_id)
                .await
                .map_err(VerificationError::Power)?;
            if power < self.min_power {
                tracing::info!(
                    miner = %claim.miner_id,
                    power = %power,
                    min = %self.min_power,
                    "insufficient power"
                );
                return Ok(CheckOutcome::new(
                    self.name(),
                    false,
                    format!("miner power too low: {power} < {}", self.min_power),
                ));
            }
            Ok(CheckOutcome::new(
                self.name(),
                true,
                format!("quality-adjusted power {power} bytes"),
            ))
        })
    }
}

// ── Geo IP ─────────────────────────────────────────────────────────────

/// Where the geo check gets its evidence snapshot.
pub enum EvidenceSource {
    /// Already in memory.
    Loaded(Arc<EvidenceStore>),
    /// Read from disk on every run.
    Files(EvidencePaths),
}

impl EvidenceSource {
    fn load(&self) -> Result<Arc<EvidenceStore>, VerificationError> {
        match self {
            EvidenceSource::Loaded(store) => Ok(Arc::clone(store)),
            EvidenceSource::Files(paths) => Ok(Arc::new(EvidenceStore::load(paths)?)),
        }
    }
}

/// Verifies the claimed location against network evidence.
pub struct GeoIpCheck<G, C, S> {
    orchestrator: GeoMatchOrchestrator<G, C>,
    chain: Arc<S>,
    evidence: EvidenceSource,
    epoch_override: Option<ChainEpoch>,
}

impl<G, C, S> GeoIpCheck<G, C, S>
where
    G: Geocoder,
    C: CommercialLookup,
    S: ChainSource,
{
    pub fn new(
        orchestrator: GeoMatchOrchestrator<G, C>,
        chain: Arc<S>,
        evidence: EvidenceSource,
    ) -> Self {
        Self {
            orchestrator,
            chain,
            evidence,
            epoch_override: None,
        }
    }

    /// Use a fixed epoch instead of asking the chain. Zero means no override.
    pub fn with_epoch_override(mut self, epoch: Option<u64>) -> Self {
        self.epoch_override = epoch.filter(|e| *e != 0).map(ChainEpoch::new);
        self
    }

    pub fn orchestrator(&self) -> &GeoMatchOrchestrator<G, C> {
        &self.orchestrator
    }

    async fn current_epoch(&self) -> Result<ChainEpoch, VerificationError> {
        match self.epoch_override {
            Some(epoch) => Ok(epoch),
            None => self
                .chain
                .current_epoch()
                .await
                .map_err(VerificationError::Epoch),
        }
    }
}

/// The location recorded for a matched claim.
///
/// Uses the first geocoded address; a match without one yields an empty location.
pub fn normalized_location(result: &MatchResult, claim: &ClaimedLocation) -> NormalizedLocation {
    let Some(address) = result.first_address() else {
        return NormalizedLocation::default();
    };
    let country = claim.normalized().country_code;
    let loc_continent = match continent_for(&country) {
        Some(continent) => continent.to_string(),
        None => {
            tracing::warn!(country = %country, "continent not found");
            String::new()
        }
    };
    let loc_city = if address.city_state.is_empty() {
        address.city.clone()
    } else {
        address.city_state.clone()
    };
    NormalizedLocation {
        loc_city,
        loc_country: address.country.clone(),
        loc_continent,
    }
}

impl<G, C, S> KycCheck for GeoIpCheck<G, C, S>
where
    G: Geocoder,
    C: CommercialLookup,
    S: ChainSource,
{
    fn name(&self) -> &str {
        "geoip"
    }

    fn run<'a>(
        &'a self,
        claim: &'a ClaimedLocation,
    ) -> BoxFuture<'a, Result<CheckOutcome, VerificationError>> {
        Box::pin(async move {
            let current = self.current_epoch().await?;
            let store = self.evidence.load()?;
            let result = self.orchestrator.verify(&store, claim, current).await?;

            let mut outcome = if result.matched {
                let location = normalized_location(&result, claim);
                let detail = match result.diagnostics.matched_tier {
                    Some(tier) => format!("location confirmed by {tier}"),
                    None => "location confirmed".to_string(),
                };
                let mut outcome = CheckOutcome::new(self.name(), true, detail);
                outcome.location = Some(location);
                outcome
            } else if result.diagnostics.filtered_evidence.is_empty() {
                CheckOutcome::new(self.name(), false, "no recent multiaddrs/IPs found".into())
            } else {
                CheckOutcome::new(self.name(), false, "no geo match found".into())
            };
            outcome.geo_match = Some(result);
            Ok(outcome)
        })
    }
}

// ── Pipeline ───────────────────────────────────────────────────────────

/// Outcome of running every check up to the first failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PipelineReport {
    pub miner_id: String,
    pub passed: bool,
    pub checks: Vec<CheckOutcome>,
}

impl PipelineReport {
    /// The location produced by the geo check, when it passed.
    pub fn location(&self) -> Option<&NormalizedLocation> {
        self.checks.iter().find_map(|c| c.location.as_ref())
    }

    pub fn geo_match(&self) -> Option<&MatchResult> {
        self.checks.iter().find_map(|c| c.geo_match.as_ref())
    }
}

/// An ordered list of checks, executed until one fails.
#[derive(Default)]
pub struct CheckPipeline {
    checks: Vec<Box<dyn KycCheck>>,
}

impl CheckPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check(mut self, check: impl KycCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub async fn run(&self, claim: &ClaimedLocation) -> Result<PipelineReport, VerificationError> {
        let mut report = PipelineReport {
            miner_id: claim.miner_id.clone(),
            passed: true,
            checks: Vec::with_capacity(self.checks.len()),
        };
        for check in &self.checks {
            let outcome = check.run(claim).await?;
            let passed = outcome.passed;
            tracing::info!(check = check.name(), miner = %claim.miner_id, passed, "{}", outcome.detail);
            report.checks.push(outcome);
            if !passed {
                report.passed = false;
                break;
            }
        }
        Ok(report)
    }
}
