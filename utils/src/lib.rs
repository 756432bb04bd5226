//! Shared utilities for geokyc.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
