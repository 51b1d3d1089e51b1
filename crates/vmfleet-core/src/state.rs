//! Abstract lifecycle states for managed workers.

use serde::{Deserialize, Serialize};

/// The lifecycle state of one worker as exposed to the caller.
///
/// This is the only status vocabulary that crosses the provider boundary;
/// raw platform status strings never do. A platform status the provider
/// does not recognize maps to `Unknown` rather than being dropped or
/// treated as an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// The platform reported a status this provider does not recognize.
    #[default]
    Unknown,
    /// The worker is being provisioned or is not yet ready for jobs.
    Creating,
    /// The worker is running and has reported ready.
    Running,
    /// The worker is stopping or being torn down.
    Deleting,
    /// The worker is stuck in an unrecoverable platform condition.
    Timeout,
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            State::Unknown => "unknown",
            State::Creating => "creating",
            State::Running => "running",
            State::Deleting => "deleting",
            State::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unknown() {
        assert_eq!(State::default(), State::Unknown);
    }

    #[test]
    fn display_matches_serde_names() {
        let json = serde_json::to_string(&State::Creating).unwrap();
        assert_eq!(json, "\"creating\"");
        assert_eq!(State::Creating.to_string(), "creating");
    }
}
