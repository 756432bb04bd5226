//! Storage-provider location verification.
//!
//! The geo-matching engine decides whether a miner's claimed city and country
//! are backed by the network addresses it has recently broadcast:
//! 1. **Recency**: keep the miner's observations from the freshness window.
//! 2. **Resolution**: join each IP to its Baidu, GeoLite2 and commercial GeoIP facts.
//! 3. **Cascade**: try the tier matchers in order; the first positive verdict wins.
//!
//! The engine runs as one check in a [`CheckPipeline`] next to the minimum
//! power requirement. Checks are listed explicitly by the caller.

pub mod cascade;
pub mod checks;
pub mod continents;
pub mod error;
pub mod matcher;
pub mod orchestrator;
pub mod outcome;
pub mod resolver;

pub use cascade::{CascadeOutcome, CountryScope, MatchCascade};
pub use checks::{
    normalized_location, CheckOutcome, CheckPipeline, EvidenceSource, GeoIpCheck, KycCheck,
    MinPowerCheck, PipelineReport, DEFAULT_MIN_POWER_BYTES,
};
pub use continents::continent_for;
pub use error::VerificationError;
pub use matcher::{
    BaiduMatcher, CommercialMatcher, GeoLiteMatcher, IpNote, MatchContext, MatchReason, Tier,
    TierMatcher, TierVerdict, DEFAULT_MAX_DISTANCE_KM,
};
pub use orchestrator::{GeoMatchOrchestrator, MatchSettings};
pub use outcome::{MatchDiagnostics, MatchResult};
pub use resolver::{ResolvedFacts, TierResolver, DEFAULT_MAX_CONCURRENT_LOOKUPS};
