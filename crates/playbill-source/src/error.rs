//! Normalized error types for generative source operations.
//!
//! Transport-agnostic errors that hide HTTP/provider details and give the
//! retry layer a stable taxonomy.

use thiserror::Error;

/// Normalized error for a generation request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// No response within the configured deadline.
    #[error("source request timed out: {message}")]
    Timeout { message: String },

    /// The source endpoint is unreachable or the connection failed.
    #[error("source transport unavailable: {message}")]
    Transport { message: String },

    /// The provider answered with an error of its own.
    #[error("source provider error: {message}")]
    Provider { message: String },

    /// The provider answered but produced no text.
    #[error("source returned an empty response")]
    EmptyResponse,

    /// The source was misconfigured; fatal at startup, never retried.
    #[error("source configuration invalid: {message}")]
    InvalidConfig { message: String },
}

impl SourceError {
    /// Whether a failed attempt should consume retry budget rather than
    /// abort the job.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidConfig { .. })
    }

    /// Stable label used in job reports and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "source-timeout",
            Self::Transport { .. } => "source-transport",
            Self::Provider { .. } => "source-provider",
            Self::EmptyResponse => "source-empty-response",
            Self::InvalidConfig { .. } => "source-invalid-config",
        }
    }
}
