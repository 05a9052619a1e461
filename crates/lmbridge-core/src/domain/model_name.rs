//! Model name codec.
//!
//! Published model repositories carry a capability suffix naming the
//! accelerator SDK and DSP generation they were converted for, e.g.
//! `qwen2-0.5b-PowerServe-QNN29-8G4`. Users pick plain names; the codec adds
//! and strips the suffix per component of a composite (`main+draft`) id.

use std::borrow::Cow;

/// Separator between the components of a composite model identifier.
pub const COMPONENT_SEPARATOR: char = '+';

/// Split a composite identifier into its components.
///
/// A plain identifier yields a single component.
pub fn split_components(id: &str) -> impl Iterator<Item = &str> {
    id.split(COMPONENT_SEPARATOR)
}

/// Join components back into one composite identifier.
pub fn join_components<I, S>(components: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, component) in components.into_iter().enumerate() {
        if i > 0 {
            out.push(COMPONENT_SEPARATOR);
        }
        out.push_str(component.as_ref());
    }
    out
}

/// Repository id on the remote host for one (encoded) model component.
pub fn repository_id(owner: &str, model: &str) -> String {
    format!("{owner}/{model}")
}

/// Adds or strips the build capability suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCodec {
    suffix: Cow<'static, str>,
}

impl Default for NameCodec {
    fn default() -> Self {
        Self::for_build()
    }
}

impl NameCodec {
    /// Codec using the suffix compiled into this build.
    #[must_use]
    pub const fn for_build() -> Self {
        Self {
            suffix: Cow::Borrowed(lmbridge_build_info::MODEL_SUFFIX),
        }
    }

    /// Codec with an explicit suffix (including its leading `-`).
    pub fn with_suffix(suffix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Append the suffix to every component.
    #[must_use]
    pub fn encode(&self, id: &str) -> String {
        join_components(split_components(id).map(|c| format!("{c}{}", self.suffix)))
    }

    /// Strip the suffix from every component that carries it.
    ///
    /// Components without the suffix pass through unchanged.
    #[must_use]
    pub fn decode(&self, id: &str) -> String {
        join_components(
            split_components(id).map(|c| c.strip_suffix(self.suffix.as_ref()).unwrap_or(c)),
        )
    }
}
