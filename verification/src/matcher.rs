//! Tier matchers: compare one evidence tier's facts against a claimed location.
//!
//! Every matcher follows the same steps per IP:
//! 1. Country gate: a fact from another country contributes nothing.
//! 2. City name: equal to the claimed city → match.
//! 3. Distance: any reference coordinate within `max_distance_km` → match.
//!
//! The scan continues over all IPs after a match so each decision is logged,
//! and a verdict once true is never unset.

use std::fmt;

use geokyc_geodesic::vincenty_distance_km;
use geokyc_types::{ClaimedLocation, Coordinate, ReferenceCoordinate};
use serde::{Deserialize, Serialize};

use crate::resolver::ResolvedFacts;

/// Maximum distance between an IP's location and the claimed city.
pub const DEFAULT_MAX_DISTANCE_KM: f64 = 600.0;

/// Baidu only covers mainland China, so its facts carry no country field.
const BAIDU_COUNTRY: &str = "CN";

/// The evidence sources, in no particular order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Baidu,
    GeoLite,
    Commercial,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Baidu => write!(f, "Baidu"),
            Tier::GeoLite => write!(f, "GeoLite2"),
            Tier::Commercial => write!(f, "GeoIP2"),
        }
    }
}

/// How a tier reached a positive verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchReason {
    City,
    Distance,
    /// Country agreed and no city data contradicted it.
    Provisional,
}

/// One logged decision about one IP.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IpNote {
    pub ip: String,
    pub message: String,
}

/// Result of evaluating one tier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TierVerdict {
    pub tier: Tier,
    pub matched: bool,
    pub reason: Option<MatchReason>,
    pub notes: Vec<IpNote>,
}

/// Inputs shared by every tier for one request.
#[derive(Clone, Copy, Debug)]
pub struct MatchContext<'a> {
    /// Already normalized.
    pub claim: &'a ClaimedLocation,
    pub references: &'a [ReferenceCoordinate],
    pub max_distance_km: f64,
}

/// Evaluates one evidence tier. Implementations are pure functions of their inputs.
pub trait TierMatcher: Send + Sync {
    fn tier(&self) -> Tier;

    fn evaluate(&self, facts: &ResolvedFacts, ctx: &MatchContext<'_>) -> TierVerdict;
}

// ── Verdict accumulation ───────────────────────────────────────────────

/// Accumulates a tier's per-IP decisions into a [`TierVerdict`].
struct VerdictBuilder<'a> {
    tier: Tier,
    ctx: &'a MatchContext<'a>,
    reason: Option<MatchReason>,
    notes: Vec<IpNote>,
}

impl<'a> VerdictBuilder<'a> {
    fn new(tier: Tier, ctx: &'a MatchContext<'a>) -> Self {
        Self {
            tier,
            ctx,
            reason: None,
            notes: Vec::new(),
        }
    }

    fn note(&mut self, ip: &str, message: String) {
        tracing::info!(tier = %self.tier, miner = %self.ctx.claim.miner_id, ip, "{message}");
        self.notes.push(IpNote {
            ip: ip.to_string(),
            message,
        });
    }

    fn matched(&mut self, reason: MatchReason) {
        if self.reason.is_none() {
            self.reason = Some(reason);
        }
    }

    fn is_matched(&self) -> bool {
        self.reason.is_some()
    }

    /// Country gate. Returns whether the fact may be considered further.
    fn country_agrees(&mut self, ip: &str, fact_country: &str) -> bool {
        let ctx = self.ctx;
        let claimed = &ctx.claim.country_code;
        if fact_country != claimed {
            self.note(
                ip,
                format!("no {} country match ({claimed} != {fact_country})", self.tier),
            );
            return false;
        }
        self.note(ip, format!("matching {} country ({claimed})", self.tier));
        true
    }

    /// Compare a fact's coordinate to every reference coordinate.
    fn check_distance(&mut self, ip: &str, location: &Coordinate) {
        let ctx = self.ctx;
        if ctx.references.is_empty() {
            self.note(ip, "no reference coordinates, distance check skipped".into());
            return;
        }
        self.note(ip, format!("{} location {location}", self.tier));
        let max = ctx.max_distance_km;
        for (i, reference) in ctx.references.iter().enumerate() {
            match vincenty_distance_km(&reference.coordinate, location) {
                Ok(distance) if distance <= max => {
                    self.note(
                        ip,
                        format!("match found, reference #{} at {distance:.3} km", i + 1),
                    );
                    self.matched(MatchReason::Distance);
                }
                Ok(distance) => {
                    self.note(
                        ip,
                        format!(
                            "no match, reference #{} at {distance:.3} km > {max} km",
                            i + 1
                        ),
                    );
                }
                Err(e) => {
                    self.note(ip, format!("unable to compute distance to reference #{}: {e}", i + 1));
                }
            }
        }
    }

    fn finish(self) -> TierVerdict {
        TierVerdict {
            tier: self.tier,
            matched: self.reason.is_some(),
            reason: self.reason,
            notes: self.notes,
        }
    }
}

// ── Matchers ───────────────────────────────────────────────────────────

/// Matches against Baidu lookups. City names compare case-insensitively.
#[derive(Clone, Copy, Debug, Default)]
pub struct BaiduMatcher;

impl TierMatcher for BaiduMatcher {
    fn tier(&self) -> Tier {
        Tier::Baidu
    }

    fn evaluate(&self, facts: &ResolvedFacts, ctx: &MatchContext<'_>) -> TierVerdict {
        let mut verdict = VerdictBuilder::new(self.tier(), ctx);
        for (ip, fact) in &facts.baidu {
            if !verdict.country_agrees(ip, BAIDU_COUNTRY) {
                continue;
            }
            if fact.city.to_lowercase() == ctx.claim.city.to_lowercase() {
                verdict.note(ip, format!("match found, city name {:?}", ctx.claim.city));
                verdict.matched(MatchReason::City);
                continue;
            }
            verdict.note(
                ip,
                format!("no city match ({} != Baidu:{})", ctx.claim.city, fact.city),
            );
            match fact.coordinate() {
                Ok(location) => verdict.check_distance(ip, &location),
                Err(e) => {
                    tracing::warn!(ip = %ip, "skipping unparseable Baidu coordinate: {e}");
                    verdict.note(ip, format!("unparseable Baidu coordinate: {e}"));
                }
            }
        }
        verdict.finish()
    }
}

/// Matches against the offline GeoLite2 database. City names compare exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct GeoLiteMatcher;

impl TierMatcher for GeoLiteMatcher {
    fn tier(&self) -> Tier {
        Tier::GeoLite
    }

    fn evaluate(&self, facts: &ResolvedFacts, ctx: &MatchContext<'_>) -> TierVerdict {
        let mut verdict = VerdictBuilder::new(self.tier(), ctx);
        for (ip, fact) in &facts.lite {
            if !verdict.country_agrees(ip, &fact.country) {
                continue;
            }
            if fact.city == ctx.claim.city {
                verdict.note(ip, format!("match found, city name {:?}", ctx.claim.city));
                verdict.matched(MatchReason::City);
                continue;
            }
            verdict.note(
                ip,
                format!("no city match ({} != GeoLite2:{})", ctx.claim.city, fact.city),
            );
            match fact.coordinate() {
                Ok(location) => verdict.check_distance(ip, &location),
                Err(e) => verdict.note(ip, format!("invalid GeoLite2 coordinate: {e}")),
            }
        }
        verdict.finish()
    }
}

/// Matches against commercial GeoIP lookups.
///
/// A city name in any locale counts. A same-country fact without any city
/// name is a provisional match, used only when nothing stronger is found.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommercialMatcher;

impl TierMatcher for CommercialMatcher {
    fn tier(&self) -> Tier {
        Tier::Commercial
    }

    fn evaluate(&self, facts: &ResolvedFacts, ctx: &MatchContext<'_>) -> TierVerdict {
        let mut verdict = VerdictBuilder::new(self.tier(), ctx);
        let mut provisional = false;

        for (ip, fact) in &facts.commercial {
            if !verdict.country_agrees(ip, &fact.country_code) {
                continue;
            }
            if fact.city_names.values().any(|name| *name == ctx.claim.city) {
                verdict.note(ip, format!("match found, city name {:?}", ctx.claim.city));
                verdict.matched(MatchReason::City);
                continue;
            }
            verdict.note(
                ip,
                format!(
                    "no city match ({} != GeoIP2:{})",
                    ctx.claim.city,
                    fact.english_city()
                ),
            );
            if fact.has_no_city() {
                provisional = true;
            }
            match &fact.coordinate {
                Some(location) => verdict.check_distance(ip, location),
                None => verdict.note(ip, "no GeoIP2 coordinate".into()),
            }
        }

        if provisional && !verdict.is_matched() {
            tracing::info!(
                miner = %ctx.claim.miner_id,
                "match found, GeoIP2 entries matched country with no city data"
            );
            verdict.matched(MatchReason::Provisional);
        }
        verdict.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geokyc_evidence::{
        BaiduContent, BaiduFact, BaiduPayload, BaiduPoint, LiteFact, LitePayload,
    };
    use geokyc_nullables::reference;
    use geokyc_types::{ChainEpoch, CommercialFact};

    fn claim(city: &str, country: &str) -> ClaimedLocation {
        ClaimedLocation::new("f01000", city, country)
    }

    fn ctx<'a>(claim: &'a ClaimedLocation, refs: &'a [ReferenceCoordinate]) -> MatchContext<'a> {
        MatchContext {
            claim,
            references: refs,
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
        }
    }

    fn lite(country: &str, city: &str, lat: f64, lon: f64) -> LiteFact {
        LiteFact {
            epoch: ChainEpoch::new(1),
            timestamp: String::new(),
            continent: String::new(),
            country: country.into(),
            subdivision: String::new(),
            city: city.into(),
            lon,
            lat,
            payload: LitePayload::default(),
        }
    }

    fn baidu(city: &str, x: &str, y: &str) -> BaiduFact {
        BaiduFact {
            epoch: ChainEpoch::new(1),
            timestamp: String::new(),
            city: city.into(),
            lon: 0.0,
            lat: 0.0,
            payload: BaiduPayload {
                content: Some(BaiduContent {
                    point: Some(BaiduPoint {
                        x: x.into(),
                        y: y.into(),
                    }),
                    extra: Default::default(),
                }),
                extra: Default::default(),
            },
        }
    }

    fn commercial(country: &str, en_city: Option<&str>, at: Option<(f64, f64)>) -> CommercialFact {
        let mut fact = CommercialFact {
            country_code: country.into(),
            coordinate: at.map(|(lat, lon)| Coordinate::new(lat, lon).unwrap()),
            ..CommercialFact::default()
        };
        if let Some(city) = en_city {
            fact.city_names.insert("en".into(), city.into());
        }
        fact
    }

    #[test]
    fn lite_city_match_ignores_coordinates() {
        let mut facts = ResolvedFacts::default();
        facts.lite.insert("192.0.2.1".into(), lite("PL", "Warsaw", -33.0, 151.0));
        let claim = claim("Warsaw", "PL");

        let verdict = GeoLiteMatcher.evaluate(&facts, &ctx(&claim, &[]));
        assert!(verdict.matched);
        assert_eq!(verdict.reason, Some(MatchReason::City));
    }

    #[test]
    fn lite_city_match_is_case_sensitive() {
        let mut facts = ResolvedFacts::default();
        facts.lite.insert("192.0.2.1".into(), lite("PL", "Warsaw", 52.23, 21.01));
        let claim = claim("warsaw", "PL");

        assert!(!GeoLiteMatcher.evaluate(&facts, &ctx(&claim, &[])).matched);
    }

    #[test]
    fn country_mismatch_blocks_close_coordinates() {
        let mut facts = ResolvedFacts::default();
        facts.lite.insert("192.0.2.1".into(), lite("US", "Detroit", 42.33, -83.05));
        let claim = claim("Windsor", "CA");
        let refs = [reference(42.31, -83.04, "Windsor", "CA")];

        let verdict = GeoLiteMatcher.evaluate(&facts, &ctx(&claim, &refs));
        assert!(!verdict.matched);
        assert!(verdict.notes.iter().all(|n| !n.message.contains("km")));
    }

    #[test]
    fn lite_distance_within_threshold_matches() {
        let mut facts = ResolvedFacts::default();
        // 500.29 km due north of the reference.
        facts.lite.insert("192.0.2.1".into(), lite("CA", "Elsewhere", 49.5, -75.0));
        let claim = claim("Somewhere", "CA");
        let refs = [reference(45.0, -75.0, "Somewhere", "CA")];

        let verdict = GeoLiteMatcher.evaluate(&facts, &ctx(&claim, &refs));
        assert!(verdict.matched);
        assert_eq!(verdict.reason, Some(MatchReason::Distance));
    }

    #[test]
    fn lite_distance_beyond_threshold_does_not_match() {
        let mut facts = ResolvedFacts::default();
        // 650.45 km due north of the reference.
        facts.lite.insert("192.0.2.1".into(), lite("CA", "Elsewhere", 50.85, -75.0));
        let claim = claim("Somewhere", "CA");
        let refs = [reference(45.0, -75.0, "Somewhere", "CA")];

        assert!(!GeoLiteMatcher.evaluate(&facts, &ctx(&claim, &refs)).matched);
    }

    #[test]
    fn later_mismatch_does_not_unset_verdict() {
        let mut facts = ResolvedFacts::default();
        facts.lite.insert("192.0.2.1".into(), lite("PL", "Warsaw", 52.23, 21.01));
        facts.lite.insert("192.0.2.2".into(), lite("DE", "Berlin", 52.52, 13.40));
        let claim = claim("Warsaw", "PL");

        let verdict = GeoLiteMatcher.evaluate(&facts, &ctx(&claim, &[]));
        assert!(verdict.matched);
        // Both IPs were scanned.
        assert!(verdict.notes.iter().any(|n| n.ip == "192.0.2.2"));
    }

    #[test]
    fn baidu_city_match_ignores_case() {
        let mut facts = ResolvedFacts::default();
        facts.baidu.insert("198.51.100.1".into(), baidu("Hangzhou", "120.15", "30.28"));
        let claim = claim("hangzhou", "CN");

        let verdict = BaiduMatcher.evaluate(&facts, &ctx(&claim, &[]));
        assert_eq!(verdict.reason, Some(MatchReason::City));
    }

    #[test]
    fn baidu_distance_uses_payload_point() {
        let mut facts = ResolvedFacts::default();
        facts.baidu.insert("198.51.100.1".into(), baidu("Jiaxing", "120.75", "30.75"));
        let claim = claim("Hangzhou", "CN");
        let refs = [reference(30.27, 120.15, "Hangzhou", "CN")];

        let verdict = BaiduMatcher.evaluate(&facts, &ctx(&claim, &refs));
        assert_eq!(verdict.reason, Some(MatchReason::Distance));
    }

    #[test]
    fn baidu_unparseable_point_is_skipped() {
        let mut facts = ResolvedFacts::default();
        facts.baidu.insert("198.51.100.1".into(), baidu("Jiaxing", "east", "30.75"));
        facts.baidu.insert("198.51.100.2".into(), baidu("Jiaxing", "120.75", "30.75"));
        let claim = claim("Hangzhou", "CN");
        let refs = [reference(30.27, 120.15, "Hangzhou", "CN")];

        let verdict = BaiduMatcher.evaluate(&facts, &ctx(&claim, &refs));
        assert!(verdict.matched);
        assert!(verdict
            .notes
            .iter()
            .any(|n| n.ip == "198.51.100.1" && n.message.contains("unparseable")));
    }

    #[test]
    fn commercial_city_in_any_locale_matches() {
        let mut facts = ResolvedFacts::default();
        let mut fact = commercial("DE", Some("Munich"), None);
        fact.city_names.insert("de".into(), "München".into());
        facts.commercial.insert("203.0.113.1".into(), fact);
        let claim = claim("München", "DE");

        let verdict = CommercialMatcher.evaluate(&facts, &ctx(&claim, &[]));
        assert_eq!(verdict.reason, Some(MatchReason::City));
    }

    #[test]
    fn commercial_without_city_is_provisional() {
        let mut facts = ResolvedFacts::default();
        facts
            .commercial
            .insert("203.0.113.1".into(), commercial("US", None, Some((37.751, -97.822))));
        let claim = claim("Las Vegas", "US");
        let refs = [reference(36.17, -115.14, "Las Vegas", "US")];

        let verdict = CommercialMatcher.evaluate(&facts, &ctx(&claim, &refs));
        assert!(verdict.matched);
        assert_eq!(verdict.reason, Some(MatchReason::Provisional));
    }

    #[test]
    fn commercial_stronger_match_wins_over_provisional() {
        let mut facts = ResolvedFacts::default();
        facts
            .commercial
            .insert("203.0.113.1".into(), commercial("US", None, None));
        facts.commercial.insert(
            "203.0.113.2".into(),
            commercial("US", Some("Henderson"), Some((36.04, -114.98))),
        );
        let claim = claim("Las Vegas", "US");
        let refs = [reference(36.17, -115.14, "Las Vegas", "US")];

        let verdict = CommercialMatcher.evaluate(&facts, &ctx(&claim, &refs));
        assert_eq!(verdict.reason, Some(MatchReason::Distance));
    }

    #[test]
    fn commercial_other_country_is_never_provisional() {
        let mut facts = ResolvedFacts::default();
        facts
            .commercial
            .insert("203.0.113.1".into(), commercial("MX", None, None));
        let claim = claim("Las Vegas", "US");

        assert!(!CommercialMatcher.evaluate(&facts, &ctx(&claim, &[])).matched);
    }

    #[test]
    fn empty_disabled_fact_never_matches() {
        let mut facts = ResolvedFacts::default();
        facts
            .commercial
            .insert("203.0.113.1".into(), CommercialFact::default());
        let claim = claim("Las Vegas", "US");

        assert!(!CommercialMatcher.evaluate(&facts, &ctx(&claim, &[])).matched);
    }
}
