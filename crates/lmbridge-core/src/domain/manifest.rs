//! Expected local file layout per model family.

use std::path::{Path, PathBuf};

/// Ordered list of relative paths a local model directory must contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelManifest {
    files: Vec<String>,
}

impl Default for ModelManifest {
    fn default() -> Self {
        Self::powerserve()
    }
}

impl ModelManifest {
    /// Layout of a converted PowerServe model.
    #[must_use]
    pub fn powerserve() -> Self {
        Self::new(["model.json", "vocab.gguf", "ggml/weights.gguf", "qnn/config.json"])
    }

    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }

    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// First manifest entry missing under `root`, in manifest order.
    #[must_use]
    pub fn first_missing(&self, root: &Path) -> Option<PathBuf> {
        self.files.iter().map(|f| root.join(f)).find(|p| !p.exists())
    }
}
