//! The instance group contract.
//!
//! An `InstanceGroup` is the single long-lived object an autoscaling
//! controller holds per worker fleet. The caller drives a control loop:
//! `init` once, then `increase`/`decrease`/`update` to converge actual
//! capacity toward desired capacity, `connect_info` per worker when
//! dispatching jobs, and `shutdown` once at the end.
//!
//! All operations are async; the control-plane calls inside them are the
//! only suspension points. Cancelling an operation means dropping its
//! future, which aborts the in-flight request. Batch operations stop at
//! the first failure and report progress through [`BatchError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BatchError, ProviderResult};
use crate::state::State;

/// Remote-access protocol for dispatching work to an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Ssh,
    Winrm,
}

/// Caller-supplied connection settings, applied to every worker.
///
/// Unset fields are filled with provider defaults when connect info is
/// resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    pub os: Option<String>,
    pub arch: Option<String>,
    pub protocol: Option<Protocol>,
    pub username: Option<String>,
    /// Private key material for static-credential access.
    pub key: Option<Vec<u8>>,
    pub use_static_credentials: bool,
}

/// Settings handed to the provider at initialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub connector: ConnectorConfig,
}

/// Identity and limits reported by a provider after initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInfo {
    /// Stable identity distinguishing this provider instance.
    pub id: String,
    /// Ceiling on the number of workers this group may hold.
    pub max_size: usize,
    /// Human-readable provider version.
    pub version: String,
    /// Build metadata (revision, reference, build time).
    pub build_info: String,
}

/// Everything a caller needs to open a remote execution session to one
/// worker. Resolved on demand, never cached.
#[derive(Debug, Clone)]
pub struct ConnectInfo {
    pub os: String,
    pub arch: String,
    pub protocol: Protocol,
    pub username: String,
    pub key: Vec<u8>,
    /// Address reachable from inside the cluster network.
    pub internal_addr: String,
}

/// Callback invoked once per worker during a status update pass.
pub type UpdateFn<'a> = &'a mut (dyn FnMut(&str, State) + Send);

/// The elastic-capacity contract a provider implements for its host.
#[async_trait]
pub trait InstanceGroup {
    /// Establish the control-plane session and validate configuration.
    ///
    /// Must be called exactly once before any other operation.
    async fn init(&mut self, settings: Settings) -> ProviderResult<ProviderInfo>;

    /// Create `delta` new workers, one at a time, stopping at the first
    /// failure. Returns the number created. No rollback on partial
    /// failure; the error carries the count created before it.
    async fn increase(&self, delta: usize) -> Result<usize, BatchError<usize>>;

    /// Delete the named workers in order, stopping at the first failure.
    /// Returns the deleted names; on failure the error carries the exact
    /// prefix deleted so far.
    async fn decrease(&self, ids: &[String]) -> Result<Vec<String>, BatchError<Vec<String>>>;

    /// List all workers in the group and report each one's abstract
    /// lifecycle state through `report`, in the order the control plane
    /// listed them. Read-only; fails only if the listing fails.
    async fn update(&self, report: UpdateFn<'_>) -> ProviderResult<()>;

    /// Resolve the connection details for one worker.
    async fn connect_info(&self, id: &str) -> ProviderResult<ConnectInfo>;

    /// Delete every worker in the group as one bulk operation.
    /// Idempotent: succeeds trivially when the group is already empty.
    async fn shutdown(&self) -> ProviderResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_config_defaults_are_unset() {
        let cfg = ConnectorConfig::default();
        assert!(cfg.os.is_none());
        assert!(cfg.key.is_none());
        assert!(!cfg.use_static_credentials);
    }

    #[test]
    fn settings_deserialize_from_empty_object() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert!(settings.connector.username.is_none());
    }

    #[test]
    fn protocol_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Protocol::Ssh).unwrap(), "\"ssh\"");
    }
}
