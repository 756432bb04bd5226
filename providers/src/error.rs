use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("provider rejected the request: {0}")]
    Rejected(String),

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}
