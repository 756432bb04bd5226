//! The ordered list of tier matchers tried for a claim.

use serde::{Deserialize, Serialize};

use crate::matcher::{
    BaiduMatcher, CommercialMatcher, GeoLiteMatcher, MatchContext, Tier, TierMatcher, TierVerdict,
};
use crate::resolver::ResolvedFacts;

/// Which claims a tier is attempted for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountryScope {
    Any,
    /// Only claims whose normalized country is listed.
    Only(Vec<String>),
}

impl CountryScope {
    pub fn only(countries: &[&str]) -> Self {
        CountryScope::Only(countries.iter().map(|c| c.to_string()).collect())
    }

    pub fn includes(&self, country_code: &str) -> bool {
        match self {
            CountryScope::Any => true,
            CountryScope::Only(countries) => countries.iter().any(|c| c == country_code),
        }
    }
}

struct CascadeTier {
    matcher: Box<dyn TierMatcher>,
    scope: CountryScope,
}

/// What the cascade concluded, with every tier it evaluated.
#[derive(Clone, Debug, PartialEq)]
pub struct CascadeOutcome {
    pub matched: bool,
    pub matched_tier: Option<Tier>,
    pub verdicts: Vec<TierVerdict>,
}

/// Tier matchers tried in order until one returns a positive verdict.
pub struct MatchCascade {
    tiers: Vec<CascadeTier>,
}

impl MatchCascade {
    /// An empty cascade. It never matches.
    pub fn new() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Append a tier, attempted only for claims in `scope`.
    pub fn with_tier(mut self, matcher: impl TierMatcher + 'static, scope: CountryScope) -> Self {
        self.tiers.push(CascadeTier {
            matcher: Box::new(matcher),
            scope,
        });
        self
    }

    /// Tiers in evaluation order.
    pub fn tiers(&self) -> Vec<Tier> {
        self.tiers.iter().map(|t| t.matcher.tier()).collect()
    }

    pub fn run(&self, facts: &ResolvedFacts, ctx: &MatchContext<'_>) -> CascadeOutcome {
        let mut verdicts = Vec::new();
        for entry in &self.tiers {
            let tier = entry.matcher.tier();
            if !entry.scope.includes(&ctx.claim.country_code) {
                tracing::debug!(tier = %tier, country = %ctx.claim.country_code, "tier not in scope");
                continue;
            }
            let verdict = entry.matcher.evaluate(facts, ctx);
            let matched = verdict.matched;
            verdicts.push(verdict);
            if matched {
                tracing::info!(tier = %tier, miner = %ctx.claim.miner_id, "geo match found");
                return CascadeOutcome {
                    matched: true,
                    matched_tier: Some(tier),
                    verdicts,
                };
            }
        }
        tracing::info!(miner = %ctx.claim.miner_id, "no match found");
        CascadeOutcome {
            matched: false,
            matched_tier: None,
            verdicts,
        }
    }
}

impl Default for MatchCascade {
    /// Baidu first for Chinese claims, then GeoLite2, then commercial GeoIP.
    fn default() -> Self {
        Self::new()
            .with_tier(BaiduMatcher, CountryScope::only(&["CN"]))
            .with_tier(GeoLiteMatcher, CountryScope::Any)
            .with_tier(CommercialMatcher, CountryScope::Any)
    }
}
