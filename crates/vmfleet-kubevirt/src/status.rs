//! Platform status to abstract lifecycle state mapping.

use vmfleet_core::State;

use crate::resources::VirtualMachineStatus;

/// Map a KubeVirt printable status to the abstract lifecycle state.
///
/// The table is total: every status KubeVirt reports maps to exactly one
/// state, and anything unrecognized maps to `State::Unknown` instead of
/// being dropped. A VM reporting `Running` only counts as running once its
/// `Ready` condition is true; until then it is still creating.
pub fn map_status(status: &VirtualMachineStatus) -> State {
    match status.printable_status.as_str() {
        "DataVolumeError" | "CrashLoopBackOff" | "ErrImagePull" | "ImagePullBackOff"
        | "PvcNotFound" | "Unknown" => State::Timeout,

        "Migrating" | "Paused" | "Provisioning" | "Starting"
        | "WaitingForVolumeBinding" => State::Creating,

        "Running" => {
            if status.is_ready() {
                State::Running
            } else {
                State::Creating
            }
        }

        "Stopped" | "Stopping" | "Terminating" => State::Deleting,

        _ => State::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Condition;

    fn status(printable: &str) -> VirtualMachineStatus {
        VirtualMachineStatus {
            printable_status: printable.into(),
            conditions: Vec::new(),
        }
    }

    fn status_ready(printable: &str) -> VirtualMachineStatus {
        VirtualMachineStatus {
            printable_status: printable.into(),
            conditions: vec![Condition {
                kind: "Ready".into(),
                status: "True".into(),
            }],
        }
    }

    #[test]
    fn failure_statuses_map_to_timeout() {
        for s in [
            "DataVolumeError",
            "CrashLoopBackOff",
            "ErrImagePull",
            "ImagePullBackOff",
            "PvcNotFound",
            "Unknown",
        ] {
            assert_eq!(map_status(&status(s)), State::Timeout, "status {s}");
        }
    }

    #[test]
    fn transitional_statuses_map_to_creating() {
        for s in [
            "Migrating",
            "Paused",
            "Provisioning",
            "Starting",
            "WaitingForVolumeBinding",
        ] {
            assert_eq!(map_status(&status(s)), State::Creating, "status {s}");
        }
    }

    #[test]
    fn running_and_ready_maps_to_running() {
        assert_eq!(map_status(&status_ready("Running")), State::Running);
    }

    #[test]
    fn running_without_ready_condition_maps_to_creating() {
        assert_eq!(map_status(&status("Running")), State::Creating);

        let not_ready = VirtualMachineStatus {
            printable_status: "Running".into(),
            conditions: vec![Condition {
                kind: "Ready".into(),
                status: "False".into(),
            }],
        };
        assert_eq!(map_status(&not_ready), State::Creating);
    }

    #[test]
    fn stopping_statuses_map_to_deleting() {
        for s in ["Stopped", "Stopping", "Terminating"] {
            assert_eq!(map_status(&status(s)), State::Deleting, "status {s}");
        }
    }

    #[test]
    fn unrecognized_status_maps_to_unknown() {
        assert_eq!(map_status(&status("Unschedulable")), State::Unknown);
        assert_eq!(map_status(&status("")), State::Unknown);
    }

    #[test]
    fn mapping_is_deterministic() {
        for s in ["Running", "Stopped", "Provisioning", "ErrImagePull", "odd"] {
            assert_eq!(map_status(&status(s)), map_status(&status(s)), "status {s}");
        }
    }
}
