//! Chain epoch type used as the evidence freshness clock.
//!
//! An epoch is one ~30 second tick of the storage network's chain.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Evidence older than this many epochs is ignored: 14 days at 2 epochs per minute.
pub const FRESHNESS_WINDOW_EPOCHS: u64 = 14 * 24 * 60 * 2;

/// A chain height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainEpoch(u64);

impl ChainEpoch {
    pub fn new(height: u64) -> Self {
        Self(height)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// The oldest epoch still inside a window of `window` epochs ending at `self`.
    pub fn window_start(&self, window: u64) -> ChainEpoch {
        ChainEpoch(self.0.saturating_sub(window))
    }

    /// Whether `observed` is no older than `window` epochs relative to `self`.
    pub fn retains(&self, observed: ChainEpoch, window: u64) -> bool {
        observed >= self.window_start(window)
    }
}

impl fmt::Display for ChainEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainEpoch {
    fn from(height: u64) -> Self {
        Self(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_two_weeks() {
        assert_eq!(FRESHNESS_WINDOW_EPOCHS, 40_320);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let now = ChainEpoch::new(2_055_000);
        let start = now.window_start(FRESHNESS_WINDOW_EPOCHS);
        assert_eq!(start.as_u64(), 2_014_680);
        assert!(now.retains(start, FRESHNESS_WINDOW_EPOCHS));
        assert!(!now.retains(ChainEpoch::new(2_014_679), FRESHNESS_WINDOW_EPOCHS));
    }

    #[test]
    fn young_chain_retains_everything() {
        let now = ChainEpoch::new(100);
        assert_eq!(now.window_start(FRESHNESS_WINDOW_EPOCHS), ChainEpoch::new(0));
        assert!(now.retains(ChainEpoch::new(0), FRESHNESS_WINDOW_EPOCHS));
    }
}
