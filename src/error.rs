use crate::http::{Failure, HttpError};
use thiserror::Error;

/// Every failure a lookup or resolution can surface to the command line.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{provider} is unavailable after {attempts} attempt(s): {message}")]
    ProviderUnavailable {
        provider: String,
        attempts: u32,
        message: String,
    },

    #[error("Movie not found: {0}")]
    MovieNotFound(String),

    #[error("Invalid quality '{0}'. Available qualities are 720p, 1080p, 2160p/4k")]
    InvalidQuality(String),

    #[error("'{movie}' is not available in {quality}")]
    QualityUnavailable { quality: String, movie: String },

    #[error("Invalid content hash '{0}': expected 40 hexadecimal characters")]
    InvalidHash(String),

    #[error("{provider} lookup failed: {message}")]
    LookupFailed { provider: String, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Failed to {operation} '{path}': {source}")]
    Io {
        operation: &'static str,
        path: String,
        source: std::io::Error,
    },
}

impl Error {
    /// Process exit code used for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_) => 2,
            Error::Io { .. } => 3,
            Error::ProviderUnavailable { .. } => 10,
            Error::MovieNotFound(_) => 11,
            Error::InvalidQuality(_) => 12,
            Error::QualityUnavailable { .. } => 13,
            Error::InvalidHash(_) => 14,
            Error::LookupFailed { .. } => 15,
        }
    }

    /// Map a failed HTTP exchange onto the provider-level error kinds.
    ///
    /// Retryable failures that ran out of attempts become `ProviderUnavailable`;
    /// everything else (4xx, malformed payloads) is a `LookupFailed`.
    pub fn from_failure(provider: &str, failure: Failure) -> Self {
        if failure.error.is_retryable() {
            Error::ProviderUnavailable {
                provider: provider.to_string(),
                attempts: failure.attempts,
                message: failure.error.to_string(),
            }
        } else {
            Error::LookupFailed {
                provider: provider.to_string(),
                message: failure.error.to_string(),
            }
        }
    }

    /// Like [`Error::from_failure`], but a 404 means the requested movie does not exist.
    pub fn from_detail_failure(provider: &str, subject: &str, failure: Failure) -> Self {
        match failure.error {
            HttpError::Status { status: 404, .. } => Error::MovieNotFound(subject.to_string()),
            _ => Self::from_failure(provider, failure),
        }
    }
}
