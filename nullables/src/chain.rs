//! Nullable chain: a fixed head epoch and per-miner power table.

use std::collections::HashMap;

use geokyc_providers::{ChainSource, ProviderError};
use geokyc_types::ChainEpoch;

/// A chain whose head never moves.
///
/// Miners without a configured power report zero.
pub struct NullChain {
    head: ChainEpoch,
    power: HashMap<String, u128>,
    unreachable: bool,
}

impl NullChain {
    pub fn new(head: u64) -> Self {
        Self {
            head: ChainEpoch::new(head),
            power: HashMap::new(),
            unreachable: false,
        }
    }

    /// Set the quality-adjusted power reported for `miner_id`.
    pub fn with_power(mut self, miner_id: impl Into<String>, bytes: u128) -> Self {
        self.power.insert(miner_id.into(), bytes);
        self
    }

    /// Make every query fail as if the node were down.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn check_reachable(&self) -> Result<(), ProviderError> {
        if self.unreachable {
            Err(ProviderError::Unreachable("null chain is offline".into()))
        } else {
            Ok(())
        }
    }
}

impl ChainSource for NullChain {
    async fn current_epoch(&self) -> Result<ChainEpoch, ProviderError> {
        self.check_reachable()?;
        Ok(self.head)
    }

    async fn miner_power(&self, miner_id: &str) -> Result<u128, ProviderError> {
        self.check_reachable()?;
        Ok(self.power.get(miner_id).copied().unwrap_or(0))
    }
}
