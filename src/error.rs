//! Error types for JOSE policy enforcement

/// Crate-level error type
#[derive(Debug, thiserror::Error)]
pub enum JoseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JOSE: unknown algorithm {0}")]
    UnknownAlgorithm(String),

    #[error("JOSE: algorithm {0} is not supported for signing")]
    UnsupportedSigningAlgorithm(String),

    #[error("JOSE: no headers to propagate. Config size: {0}")]
    NoHeadersToPropagate(usize),

    #[error("JOSE: invalid key fingerprint at position {index}: {reason}")]
    InvalidFingerprint { index: usize, reason: String },

    #[error("Authentication required")]
    MissingToken,

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Failed to sign field `{field}`: {source}")]
    Signing {
        field: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to sign payload: {0}")]
    PayloadSigning(#[source] anyhow::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, JoseError>;

impl JoseError {
    /// HTTP status that best describes this error when surfaced to a client
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            JoseError::MissingToken | JoseError::Authentication(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the error was caused by the operator's setup rather than a request
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            JoseError::Config(_)
                | JoseError::UnknownAlgorithm(_)
                | JoseError::UnsupportedSigningAlgorithm(_)
                | JoseError::NoHeadersToPropagate(_)
                | JoseError::InvalidFingerprint { .. }
        )
    }
}
