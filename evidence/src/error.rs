use std::path::PathBuf;

use geokyc_types::TypesError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("failed to read evidence file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed evidence file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("lookup has no content.point")]
    MissingPoint,

    #[error(transparent)]
    Coordinate(#[from] TypesError),
}
