use thiserror::Error;

use crate::detect::EngineError;

/// Typed error hierarchy for credsweep.
///
/// Use at module boundaries (engine calls, config loading, CLI commands).
/// Internal/leaf functions can continue using `anyhow::Result` — the
/// `Internal` variant allows seamless conversion via the `?` operator.
#[derive(Debug, Error)]
pub enum CredsweepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scan failed: {0}")]
    Scan(#[from] EngineError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience alias for results using CredsweepError.
pub type CredsweepResult<T> = std::result::Result<T, CredsweepError>;

impl CredsweepError {
    /// Whether the operation is worth retrying (transient I/O, wrapped
    /// internals). Cancellation and configuration problems are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Scan(EngineError::Io(_)) | Self::Internal(_) => true,
            Self::Scan(EngineError::Cancelled) | Self::Config(_) => false,
        }
    }
}
