use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeodesicError {
    #[error("Vincenty iteration did not converge after {iterations} iterations")]
    NoConvergence { iterations: u32 },
}
