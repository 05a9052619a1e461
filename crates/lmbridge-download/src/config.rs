//! Fetch configuration.

use std::time::Duration;

use lmbridge_core::ModelManifest;

/// Tunables for file transfers and local validation.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Interval between aggregate progress samples.
    pub progress_interval: Duration,
    /// Repository-relative paths that are never transferred.
    pub excluded_files: Vec<String>,
    /// Upper bound on concurrently running file transfers.
    pub max_concurrent_files: usize,
    /// Owner under which every model repository is published.
    pub repo_owner: String,
    /// Files a local model directory must contain.
    pub manifest: ModelManifest,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(200),
            excluded_files: vec![".gitattributes".to_string(), "README.md".to_string()],
            max_concurrent_files: 4,
            repo_owner: "PowerServe".to_string(),
            manifest: ModelManifest::default(),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Values below 1 are treated as 1.
    #[must_use]
    pub const fn with_max_concurrent_files(mut self, max: usize) -> Self {
        self.max_concurrent_files = max;
        self
    }

    #[must_use]
    pub fn with_repo_owner(mut self, owner: impl Into<String>) -> Self {
        self.repo_owner = owner.into();
        self
    }

    #[must_use]
    pub fn with_manifest(mut self, manifest: ModelManifest) -> Self {
        self.manifest = manifest;
        self
    }

    pub(crate) fn is_excluded(&self, path: &str) -> bool {
        self.excluded_files.iter().any(|e| e == path)
    }

    pub(crate) fn concurrency(&self) -> usize {
        self.max_concurrent_files.max(1)
    }
}
