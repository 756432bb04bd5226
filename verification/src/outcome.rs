//! The verdict of one geo-matching run and its audit trail.

use std::collections::BTreeMap;

use geokyc_evidence::{NetworkEvidenceRecord, RejectedRecord};
use geokyc_types::{Address, Coordinate};
use serde::Serialize;

use crate::matcher::{Tier, TierVerdict};

/// Everything the engine saw and decided, returned whether or not it matched.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MatchDiagnostics {
    pub filtered_evidence: Vec<NetworkEvidenceRecord>,
    pub rejected_evidence: Vec<RejectedRecord>,
    pub reference_coordinates: Vec<Coordinate>,
    pub resolved_addresses: Vec<Address>,
    pub tier_verdicts: Vec<TierVerdict>,
    pub commercial_failures: BTreeMap<String, String>,
    pub matched_tier: Option<Tier>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MatchResult {
    pub matched: bool,
    pub diagnostics: MatchDiagnostics,
}

impl MatchResult {
    /// The first geocoded address, if any.
    pub fn first_address(&self) -> Option<&Address> {
        self.diagnostics.resolved_addresses.first()
    }
}
