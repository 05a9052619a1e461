#![doc = include_str!("../README.md")]

/// The `SemVer` version of the build (from Cargo).
pub const SEMVER: &str = env!("CARGO_PKG_VERSION");

/// QNN SDK major version the native engine was built against.
pub const QNN_SDK_VERSION: &str = env!("LMBRIDGE_QNN_SDK_VERSION");

/// Hexagon DSP generation the native engine was built for.
pub const HEXAGON_VERSION: &str = env!("LMBRIDGE_HEXAGON_VERSION");

/// Version string used by CLI `--version` output.
///
/// Example: `0.3.0 (QNN29, 8G4)`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (QNN",
    env!("LMBRIDGE_QNN_SDK_VERSION"),
    ", ",
    env!("LMBRIDGE_HEXAGON_VERSION"),
    ")"
);

/// The capability suffix appended to every model component name.
///
/// Model packages on the host are published per accelerator stack, so the
/// suffix is what turns `qwen2-0.5b` into `qwen2-0.5b-PowerServe-QNN29-8G4`.
pub const MODEL_SUFFIX: &str = concat!(
    "-PowerServe-QNN",
    env!("LMBRIDGE_QNN_SDK_VERSION"),
    "-",
    env!("LMBRIDGE_HEXAGON_VERSION")
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_embeds_both_tags() {
        assert!(MODEL_SUFFIX.starts_with("-PowerServe-QNN"));
        assert!(MODEL_SUFFIX.contains(QNN_SDK_VERSION));
        assert!(MODEL_SUFFIX.ends_with(HEXAGON_VERSION));
    }

    #[test]
    fn long_version_starts_with_semver() {
        assert!(LONG_VERSION.starts_with(SEMVER));
        assert!(LONG_VERSION.contains(HEXAGON_VERSION));
    }
}
