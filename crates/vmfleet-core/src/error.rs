//! Error types for capacity provider operations.

use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced by an instance group provider.
///
/// The provider performs no retries of its own; every variant is reported
/// to the caller as-is, and retry/backoff policy lives with the caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Missing or malformed settings. Fatal, surfaced immediately.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Session or credential establishment failed. Fatal to init.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// A control-plane call failed for a named resource.
    #[error("remote operation on {resource} failed: {source}")]
    Remote {
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    /// A required remote object or attribute does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ProviderError {
    /// Shorthand for a remote-operation error tagged with a resource name.
    pub fn remote(resource: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        ProviderError::Remote {
            resource: resource.into(),
            source: source.into(),
        }
    }

    /// Whether this error came from the configuration surface.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::Configuration(_))
    }
}

/// Error from a batch capacity mutation that stopped at the first failure.
///
/// Carries the progress made before the failure: the number of workers
/// created for an increase, or the prefix of workers deleted for a
/// decrease. No compensating rollback is performed; the caller reconciles
/// via the status update loop.
#[derive(Debug, Error)]
#[error("stopped after partial completion: {source}")]
pub struct BatchError<T: std::fmt::Debug> {
    /// Work completed before the failure.
    pub completed: T,
    #[source]
    pub source: ProviderError,
}
