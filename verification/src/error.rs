use geokyc_evidence::EvidenceError;
use geokyc_providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("evidence error: {0}")]
    Evidence(#[from] EvidenceError),

    #[error("geocoding failed: {0}")]
    Geocode(ProviderError),

    #[error("failed to get current epoch: {0}")]
    Epoch(ProviderError),

    #[error("failed to look up miner power: {0}")]
    Power(ProviderError),
}
