//! Mock control-plane client for testing.
//!
//! Holds an in-memory set of machines and instances and supports scripted
//! failures, so provider tests can exercise partial-failure behavior
//! without a cluster.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;

use vmfleet_core::{ProviderError, ProviderResult};

use crate::client::VirtClient;
use crate::resources::{
    Condition, InstanceInterface, InstanceStatus, VirtualMachine, VirtualMachineInstance,
    VirtualMachineStatus,
};

#[derive(Default)]
struct MockInner {
    machines: Vec<VirtualMachine>,
    instances: HashMap<String, VirtualMachineInstance>,
    created: usize,
    fail_create_after: Option<usize>,
    fail_delete_of: Option<String>,
    fail_list: bool,
    fail_delete_collection: bool,
}

/// In-memory `VirtClient` with scripted failures.
///
/// Clones share state, so a test can keep a handle for assertions after
/// handing a clone to the provider.
#[derive(Clone, Default)]
pub struct MockVirtClient {
    inner: Arc<Mutex<MockInner>>,
}

impl MockVirtClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let the first `n` creates succeed, then fail every later one.
    pub fn fail_create_after(self, n: usize) -> Self {
        self.inner.lock().unwrap().fail_create_after = Some(n);
        self
    }

    /// Fail the delete of one specific machine name.
    pub fn fail_delete_of(self, name: &str) -> Self {
        self.inner.lock().unwrap().fail_delete_of = Some(name.to_string());
        self
    }

    /// Fail every list call.
    pub fn fail_list(self) -> Self {
        self.inner.lock().unwrap().fail_list = true;
        self
    }

    /// Fail every delete-collection call.
    pub fn fail_delete_collection(self) -> Self {
        self.inner.lock().unwrap().fail_delete_collection = true;
        self
    }

    /// Seed one machine with a given platform status and readiness.
    pub fn with_machine(self, name: &str, labels: &[(&str, &str)], status: &str, ready: bool) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let mut vm = VirtualMachine::default();
            vm.metadata.name = name.to_string();
            vm.metadata.labels = labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            vm.status = VirtualMachineStatus {
                printable_status: status.to_string(),
                conditions: if ready {
                    vec![Condition {
                        kind: "Ready".into(),
                        status: "True".into(),
                    }]
                } else {
                    Vec::new()
                },
            };
            inner.machines.push(vm);
        }
        self
    }

    /// Seed one running instance with named interfaces and addresses.
    pub fn with_instance(self, name: &str, interfaces: &[(&str, &str)]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            let vmi = VirtualMachineInstance {
                metadata: crate::resources::ObjectMeta {
                    name: name.to_string(),
                    ..Default::default()
                },
                status: InstanceStatus {
                    interfaces: interfaces
                        .iter()
                        .map(|(ifc, ip)| InstanceInterface {
                            interface_name: ifc.to_string(),
                            ip_address: ip.to_string(),
                        })
                        .collect(),
                },
            };
            inner.instances.insert(name.to_string(), vmi);
        }
        self
    }

    /// Names of all machines currently held, in insertion order.
    pub fn machine_names(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .machines
            .iter()
            .map(|vm| vm.metadata.name.clone())
            .collect()
    }

    pub fn machine_count(&self) -> usize {
        self.inner.lock().unwrap().machines.len()
    }

    fn matches(vm: &VirtualMachine, selector: &str) -> bool {
        match selector.split_once('=') {
            Some((key, value)) => vm.metadata.labels.get(key).is_some_and(|v| v == value),
            None => false,
        }
    }
}

#[async_trait]
impl VirtClient for MockVirtClient {
    async fn list_machines(&self, selector: &str) -> ProviderResult<Vec<VirtualMachine>> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_list {
            return Err(ProviderError::remote(
                "virtualmachines",
                anyhow!("injected list failure"),
            ));
        }
        Ok(inner
            .machines
            .iter()
            .filter(|vm| Self::matches(vm, selector))
            .cloned()
            .collect())
    }

    async fn create_machine(&self, machine: &VirtualMachine) -> ProviderResult<VirtualMachine> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(limit) = inner.fail_create_after
            && inner.created >= limit
        {
            return Err(ProviderError::remote(
                "virtualmachines",
                anyhow!("injected create failure"),
            ));
        }
        let mut created = machine.clone();
        created.metadata.name = format!("{}{:05}", machine.metadata.generate_name, inner.created);
        inner.created += 1;
        inner.machines.push(created.clone());
        Ok(created)
    }

    async fn delete_machine(&self, name: &str) -> ProviderResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete_of.as_deref() == Some(name) {
            return Err(ProviderError::remote(
                format!("virtualmachines/{name}"),
                anyhow!("injected delete failure"),
            ));
        }
        let position = inner
            .machines
            .iter()
            .position(|vm| vm.metadata.name == name)
            .ok_or_else(|| {
                ProviderError::remote(
                    format!("virtualmachines/{name}"),
                    anyhow!("the server could not find the requested resource"),
                )
            })?;
        inner.machines.remove(position);
        Ok(())
    }

    async fn delete_machines(&self, selector: &str) -> ProviderResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_delete_collection {
            return Err(ProviderError::remote(
                "virtualmachines",
                anyhow!("injected delete-collection failure"),
            ));
        }
        inner.machines.retain(|vm| !Self::matches(vm, selector));
        Ok(())
    }

    async fn get_instance(&self, name: &str) -> ProviderResult<VirtualMachineInstance> {
        let inner = self.inner.lock().unwrap();
        inner.instances.get(name).cloned().ok_or_else(|| {
            ProviderError::remote(
                format!("virtualmachineinstances/{name}"),
                anyhow!("the server could not find the requested resource"),
            )
        })
    }
}
