use std::env;

/// Accelerator tags baked into model identifiers. Packagers targeting a
/// different SoC or SDK override them through the environment.
const TAGS: &[(&str, &str)] = &[
    ("LMBRIDGE_QNN_SDK_VERSION", "29"),
    ("LMBRIDGE_HEXAGON_VERSION", "8G4"),
];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    for (key, fallback) in TAGS {
        println!("cargo:rerun-if-env-changed={key}");

        let value = env::var(key)
            .ok()
            .and_then(|raw| normalize_tag(&raw))
            .unwrap_or_else(|| (*fallback).to_string());

        println!("cargo:rustc-env={key}={value}");
    }
}

/// Tags end up inside repository names, so only ASCII alphanumerics survive.
fn normalize_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(trimmed.to_string())
    } else {
        println!("cargo:warning=lmbridge-build-info: ignoring malformed tag '{trimmed}'");
        None
    }
}
