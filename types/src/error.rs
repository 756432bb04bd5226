//! Errors raised while constructing core values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TypesError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("coordinate component is not a finite number")]
    NonFiniteCoordinate,

    #[error("cannot parse coordinate component {value:?}: {reason}")]
    UnparseableCoordinate { value: String, reason: String },
}
