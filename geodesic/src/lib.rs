//! Geodesic distance between two coordinates on the WGS84 ellipsoid.
//!
//! Uses Vincenty's inverse formula. The iteration does not converge for
//! nearly antipodal points; those inputs return [`GeodesicError::NoConvergence`]
//! instead of a distance.

pub mod error;
pub mod vincenty;

pub use error::GeodesicError;
pub use vincenty::{vincenty_distance_km, Ellipsoid, WGS84};
