pub mod aws;
pub mod basic_auth;
pub mod catalogue;
pub mod http;
pub mod sigv4;

pub use aws::StsValidator;
pub use basic_auth::BasicAuthValidator;
pub use catalogue::ValidatorSet;
pub use http::HttpValidator;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::secret::Secret;

/// Outcome of checking a secret against its issuing service.
///
/// `Valid` and `Invalid` are authoritative and never carry an error.
/// `Failed` means no definitive answer was reached — transport error,
/// unexpected status, body parse failure, or cancellation — and wraps the
/// cause; hosts treat it as retryable.
#[derive(Debug)]
pub enum Validation {
    Valid,
    Invalid,
    Failed(anyhow::Error),
}

impl Validation {
    pub fn failed(cause: impl Into<anyhow::Error>) -> Self {
        Validation::Failed(cause.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Validation::Invalid)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Validation::Failed(_))
    }

    /// Whether the host should retry (only non-definitive outcomes).
    pub fn is_retryable(&self) -> bool {
        self.is_failed()
    }
}

impl std::fmt::Display for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validation::Valid => f.write_str("valid"),
            Validation::Invalid => f.write_str("invalid"),
            Validation::Failed(cause) => write!(f, "failed: {:#}", cause),
        }
    }
}

/// A process that turns a secret value into a live-or-dead classification
/// via a provider call. Validators never mutate secrets; cancellation of the
/// token aborts the next transport suspension point and yields `Failed`.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, cancel: &CancellationToken, secret: &Secret) -> Validation;
}
