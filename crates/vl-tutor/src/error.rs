//! Error types for tutor transport.

/// Tutor failure. Callers normally swap these for
/// [`FALLBACK_NOTICE`](crate::FALLBACK_NOTICE) instead of showing them.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    #[error("API key not found in ${var}")]
    MissingCredentials { var: String },

    #[error("Tutor backend not configured: {0}")]
    NotConfigured(String),

    #[error("Tutor backend failed: {message}")]
    Backend { message: String },

    #[error("Tutor worker disconnected")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TutorResult<T> = Result<T, TutorError>;
