//! Wire models for the KubeVirt control plane.
//!
//! Only the fields this provider reads or writes are modeled; everything
//! else in the remote objects is ignored on deserialization and omitted on
//! serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::GroupConfig;

/// API group/version every request targets.
pub const API_GROUP_VERSION: &str = "kubevirt.io/v1";

/// Volume name of the image-backed root disk.
const CONTAINER_DISK: &str = "containerdisk";
/// Volume name of the cloud-init disk.
const CLOUD_INIT_DISK: &str = "cloudinitdisk";

// ── Shared metadata ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectMeta {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub generate_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

// ── VirtualMachine ─────────────────────────────────────────────────

/// A KubeVirt `VirtualMachine`: one managed worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualMachine {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: VirtualMachineSpec,
    #[serde(skip_serializing)]
    pub status: VirtualMachineStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualMachineSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<InstanceTemplate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceTemplate {
    pub metadata: ObjectMeta,
    pub spec: InstanceSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<Probe>,
    pub domain: DomainSpec,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Probe {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecAction>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecAction {
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<Memory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    pub devices: Devices,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Memory {
    /// Guest-visible memory as a Kubernetes quantity string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cpu {
    pub cores: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Devices {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disks: Vec<Disk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Disk {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Volume {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_disk: Option<ContainerDiskSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_init_no_cloud: Option<CloudInitNoCloudSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerDiskSource {
    pub image: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudInitNoCloudSource {
    pub user_data: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualMachineStatus {
    /// Platform status string, e.g. "Running", "Provisioning".
    pub printable_status: String,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl VirtualMachineStatus {
    /// Whether a `Ready` condition is present and true.
    pub fn is_ready(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| c.kind == "Ready" && c.status == "True")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualMachineList {
    pub items: Vec<VirtualMachine>,
}

// ── VirtualMachineInstance ─────────────────────────────────────────

/// A KubeVirt `VirtualMachineInstance`: the running guest, carrying the
/// network interfaces connect-info resolution reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualMachineInstance {
    pub metadata: ObjectMeta,
    pub status: InstanceStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceStatus {
    pub interfaces: Vec<InstanceInterface>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceInterface {
    pub interface_name: String,
    pub ip_address: String,
}

// ── Worker template ────────────────────────────────────────────────

/// Build the `VirtualMachine` submitted for one new worker.
///
/// `cores` is the already-validated CPU core count. The label pair goes on
/// both the VM object and its instance template so every list and
/// bulk-delete stays scoped to the group.
pub fn worker_template(config: &GroupConfig, cores: u32) -> VirtualMachine {
    let labels: BTreeMap<String, String> = [(
        config.vm_label_key.clone(),
        config.vm_label_value.clone(),
    )]
    .into();

    VirtualMachine {
        api_version: API_GROUP_VERSION.to_string(),
        kind: "VirtualMachine".to_string(),
        metadata: ObjectMeta {
            generate_name: config.vm_name_prefix.clone(),
            labels: labels.clone(),
            ..Default::default()
        },
        spec: VirtualMachineSpec {
            run_strategy: Some("Always".to_string()),
            template: Some(InstanceTemplate {
                metadata: ObjectMeta {
                    labels,
                    ..Default::default()
                },
                spec: InstanceSpec {
                    readiness_probe: Some(Probe {
                        exec: Some(ExecAction {
                            command: vec![
                                "sh".to_string(),
                                "-c".to_string(),
                                config.vm_readiness_probe_script.clone(),
                            ],
                        }),
                    }),
                    domain: DomainSpec {
                        memory: Some(Memory {
                            guest: Some(config.vm_ram.clone()),
                        }),
                        cpu: Some(Cpu { cores }),
                        devices: Devices {
                            disks: vec![
                                Disk {
                                    name: CONTAINER_DISK.to_string(),
                                },
                                Disk {
                                    name: CLOUD_INIT_DISK.to_string(),
                                },
                            ],
                        },
                    },
                    volumes: vec![
                        Volume {
                            name: CONTAINER_DISK.to_string(),
                            container_disk: Some(ContainerDiskSource {
                                image: config.vm_runner_image.clone(),
                            }),
                            cloud_init_no_cloud: None,
                        },
                        Volume {
                            name: CLOUD_INIT_DISK.to_string(),
                            container_disk: None,
                            cloud_init_no_cloud: Some(CloudInitNoCloudSource {
                                user_data: config.vm_cloud_init_user_data.clone(),
                            }),
                        },
                    ],
                },
            }),
        },
        status: VirtualMachineStatus::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GroupConfig {
        GroupConfig {
            vm_label_key: "fleet".into(),
            vm_label_value: "ci".into(),
            vm_name_prefix: "runner-".into(),
            vm_ram: "2Gi".into(),
            vm_cpu_cores: "2".into(),
            vm_cloud_init_user_data: "#cloud-config".into(),
            vm_runner_image: "img:latest".into(),
            vm_readiness_probe_script: "test -f /ready".into(),
            ..Default::default()
        }
    }

    #[test]
    fn template_carries_group_labels_on_vm_and_instance() {
        let vm = worker_template(&test_config(), 2);
        assert_eq!(vm.metadata.labels.get("fleet").unwrap(), "ci");
        let template = vm.spec.template.as_ref().unwrap();
        assert_eq!(template.metadata.labels.get("fleet").unwrap(), "ci");
    }

    #[test]
    fn template_serializes_expected_wire_shape() {
        let vm = worker_template(&test_config(), 2);
        let json = serde_json::to_value(&vm).unwrap();

        assert_eq!(json["apiVersion"], "kubevirt.io/v1");
        assert_eq!(json["metadata"]["generateName"], "runner-");
        assert_eq!(json["spec"]["runStrategy"], "Always");

        let spec = &json["spec"]["template"]["spec"];
        assert_eq!(spec["readinessProbe"]["exec"]["command"][2], "test -f /ready");
        assert_eq!(spec["domain"]["memory"]["guest"], "2Gi");
        assert_eq!(spec["domain"]["cpu"]["cores"], 2);
        assert_eq!(spec["volumes"][0]["containerDisk"]["image"], "img:latest");
        assert_eq!(spec["volumes"][1]["cloudInitNoCloud"]["userData"], "#cloud-config");
        // Status is provider-read-only and never sent.
        assert!(json.get("status").is_none());
    }

    #[test]
    fn ready_condition_detection() {
        let mut status = VirtualMachineStatus {
            printable_status: "Running".into(),
            conditions: vec![Condition {
                kind: "Ready".into(),
                status: "False".into(),
            }],
        };
        assert!(!status.is_ready());

        status.conditions.push(Condition {
            kind: "Ready".into(),
            status: "True".into(),
        });
        assert!(status.is_ready());
    }

    #[test]
    fn deserializes_remote_vm_status() {
        let json = r#"{
            "metadata": {"name": "runner-abc12", "labels": {"fleet": "ci"}},
            "spec": {},
            "status": {
                "printableStatus": "Running",
                "conditions": [{"type": "Ready", "status": "True"}]
            }
        }"#;
        let vm: VirtualMachine = serde_json::from_str(json).unwrap();
        assert_eq!(vm.metadata.name, "runner-abc12");
        assert_eq!(vm.status.printable_status, "Running");
        assert!(vm.status.is_ready());
    }

    #[test]
    fn deserializes_instance_interfaces() {
        let json = r#"{
            "metadata": {"name": "runner-abc12"},
            "status": {
                "interfaces": [
                    {"interfaceName": "docker0", "ipAddress": "10.0.0.1"},
                    {"interfaceName": "eth0", "ipAddress": "10.0.0.2"}
                ]
            }
        }"#;
        let vmi: VirtualMachineInstance = serde_json::from_str(json).unwrap();
        assert_eq!(vmi.status.interfaces.len(), 2);
        assert_eq!(vmi.status.interfaces[1].ip_address, "10.0.0.2");
    }
}
