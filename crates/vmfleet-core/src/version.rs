//! Static version metadata reported through `ProviderInfo`.

/// Version stamp for a provider build.
///
/// Revision, reference, and build time default to placeholder values and
/// are overridden by the release pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub revision: &'static str,
    pub reference: &'static str,
    pub built_at: &'static str,
}

impl VersionInfo {
    /// A stamp carrying only name and version, with placeholder build data.
    pub const fn new(name: &'static str, version: &'static str) -> Self {
        Self {
            name,
            version,
            revision: "HEAD",
            reference: "HEAD",
            built_at: "now",
        }
    }

    /// Short form, e.g. `vmfleet-kubevirt v0.1.0`.
    pub fn summary(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }

    /// Build detail line for diagnostics.
    pub fn build_info(&self) -> String {
        format!(
            "rev={}, ref={}, built={}",
            self.revision, self.reference, self.built_at
        )
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_includes_name_and_version() {
        let v = VersionInfo::new("vmfleet-kubevirt", "0.1.0");
        assert_eq!(v.summary(), "vmfleet-kubevirt v0.1.0");
        assert_eq!(v.to_string(), v.summary());
    }

    #[test]
    fn build_info_uses_placeholders_by_default() {
        let v = VersionInfo::new("vmfleet-kubevirt", "0.1.0");
        assert_eq!(v.build_info(), "rev=HEAD, ref=HEAD, built=now");
    }
}
