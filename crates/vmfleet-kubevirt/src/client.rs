//! Control-plane client seam.
//!
//! The provider talks to KubeVirt exclusively through this trait: get on
//! the instance kind, list/create/delete/delete-collection on the machine
//! kind, all scoped to one namespace fixed at construction. The real
//! implementation is [`crate::http::HttpVirtClient`]; tests use
//! [`crate::mock::MockVirtClient`].

use async_trait::async_trait;

use vmfleet_core::ProviderResult;

use crate::resources::{VirtualMachine, VirtualMachineInstance};

/// Namespace-scoped client for the two KubeVirt resource kinds.
#[async_trait]
pub trait VirtClient: Send + Sync {
    /// List machines matching a `key=value` label selector.
    async fn list_machines(&self, selector: &str) -> ProviderResult<Vec<VirtualMachine>>;

    /// Submit a machine for creation; returns the created object with its
    /// generated name filled in.
    async fn create_machine(&self, machine: &VirtualMachine) -> ProviderResult<VirtualMachine>;

    /// Delete one machine by name. Deleting a name the control plane does
    /// not know is an error.
    async fn delete_machine(&self, name: &str) -> ProviderResult<()>;

    /// Delete every machine matching the label selector, as one call.
    async fn delete_machines(&self, selector: &str) -> ProviderResult<()>;

    /// Fetch the running instance for one machine.
    async fn get_instance(&self, name: &str) -> ProviderResult<VirtualMachineInstance>;
}
