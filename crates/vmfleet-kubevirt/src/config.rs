//! Instance group configuration.
//!
//! Deserialized from the JSON blob the host passes when it constructs the
//! provider. All `vm*` fields are mandatory; `validate()` is called during
//! init, after the control-plane session exists but before any
//! connection-dependent work.

use serde::{Deserialize, Serialize};
use vmfleet_core::{ProviderError, ProviderResult};

/// Configuration for one KubeVirt-backed instance group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GroupConfig {
    /// Use the ambient in-cluster service account instead of a kubeconfig.
    pub use_in_cluster_config: bool,
    /// Raw kubeconfig YAML; ignored when `use_in_cluster_config` is set.
    pub kubeconfig: String,

    /// Label key marking VMs as members of this group.
    pub vm_label_key: String,
    /// Label value marking VMs as members of this group.
    pub vm_label_value: String,
    /// Namespace all group VMs live in.
    pub vm_namespace: String,
    /// Prefix for generated VM names.
    pub vm_name_prefix: String,
    /// Guest memory as a Kubernetes quantity, e.g. "2Gi".
    #[serde(rename = "vmRAM")]
    pub vm_ram: String,
    /// Guest CPU core count, as a decimal string.
    #[serde(rename = "vmCPUCores")]
    pub vm_cpu_cores: String,
    /// Cloud-init user data injected into each VM.
    pub vm_cloud_init_user_data: String,
    /// Container image backing each VM's root disk.
    pub vm_runner_image: String,
    /// Shell script run as the readiness probe inside the guest.
    pub vm_readiness_probe_script: String,
}

impl GroupConfig {
    /// Check that every mandatory field is present.
    ///
    /// Fails with a configuration error naming the first missing field.
    pub fn validate(&self) -> ProviderResult<()> {
        let required = [
            ("vmLabelKey", &self.vm_label_key),
            ("vmLabelValue", &self.vm_label_value),
            ("vmNamespace", &self.vm_namespace),
            ("vmNamePrefix", &self.vm_name_prefix),
            ("vmRAM", &self.vm_ram),
            ("vmCPUCores", &self.vm_cpu_cores),
            ("vmCloudInitUserData", &self.vm_cloud_init_user_data),
            ("vmRunnerImage", &self.vm_runner_image),
            ("vmReadinessProbeScript", &self.vm_readiness_probe_script),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(ProviderError::Configuration(format!(
                    "missing required parameter {name}"
                )));
            }
        }
        Ok(())
    }

    /// The `key=value` selector scoping every list and bulk-delete call.
    pub fn label_selector(&self) -> String {
        format!("{}={}", self.vm_label_key, self.vm_label_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> GroupConfig {
        GroupConfig {
            use_in_cluster_config: true,
            kubeconfig: String::new(),
            vm_label_key: "fleet".into(),
            vm_label_value: "ci-workers".into(),
            vm_namespace: "runners".into(),
            vm_name_prefix: "runner-".into(),
            vm_ram: "2Gi".into(),
            vm_cpu_cores: "2".into(),
            vm_cloud_init_user_data: "#cloud-config\n".into(),
            vm_runner_image: "quay.io/containerdisks/debian:12".into(),
            vm_readiness_probe_script: "test -f /tmp/ready".into(),
        }
    }

    #[test]
    fn complete_config_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn each_missing_field_is_a_configuration_error() {
        let clear: [(&str, fn(&mut GroupConfig)); 9] = [
            ("vmLabelKey", |c| c.vm_label_key.clear()),
            ("vmLabelValue", |c| c.vm_label_value.clear()),
            ("vmNamespace", |c| c.vm_namespace.clear()),
            ("vmNamePrefix", |c| c.vm_name_prefix.clear()),
            ("vmRAM", |c| c.vm_ram.clear()),
            ("vmCPUCores", |c| c.vm_cpu_cores.clear()),
            ("vmCloudInitUserData", |c| c.vm_cloud_init_user_data.clear()),
            ("vmRunnerImage", |c| c.vm_runner_image.clear()),
            ("vmReadinessProbeScript", |c| c.vm_readiness_probe_script.clear()),
        ];

        for (name, clear_field) in clear {
            let mut config = complete();
            clear_field(&mut config);
            let err = config.validate().unwrap_err();
            assert!(err.is_configuration(), "field {name}: wrong error kind");
            assert!(
                err.to_string().contains(name),
                "field {name}: error should name the field, got: {err}"
            );
        }
    }

    #[test]
    fn deserializes_original_field_names() {
        let json = r##"{
            "useInClusterConfig": false,
            "kubeconfig": "apiVersion: v1",
            "vmLabelKey": "fleet",
            "vmLabelValue": "ci",
            "vmNamespace": "runners",
            "vmNamePrefix": "runner-",
            "vmRAM": "4Gi",
            "vmCPUCores": "4",
            "vmCloudInitUserData": "#cloud-config",
            "vmRunnerImage": "img:latest",
            "vmReadinessProbeScript": "true"
        }"##;
        let config: GroupConfig = serde_json::from_str(json).unwrap();
        assert!(!config.use_in_cluster_config);
        assert_eq!(config.vm_ram, "4Gi");
        assert_eq!(config.vm_cpu_cores, "4");
        assert_eq!(config.label_selector(), "fleet=ci");
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let config: GroupConfig = serde_json::from_str("{}").unwrap();
        assert!(config.validate().is_err());
    }
}
