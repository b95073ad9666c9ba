//! Error types shared by the generation pipeline, the store and the API

/// Result type for podcast-digest operations
pub type Result<T> = std::result::Result<T, DigestError>;

/// Error types for podcast-digest operations
#[derive(thiserror::Error, Debug)]
pub enum DigestError {
    #[error("{0}")]
    MissingInput(String),

    /// Upstream completion service returned a non-success status.
    #[error("{0}")]
    Upstream(String),

    #[error("Failed to parse AI response")]
    UnparseableResponse { raw: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DigestError {
    /// Raw upstream text attached to parse failures, for diagnostics
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            DigestError::UnparseableResponse { raw } => Some(raw),
            _ => None,
        }
    }
}
