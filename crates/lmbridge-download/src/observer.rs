//! Acquisition observer.

use lmbridge_core::{DownloadError, FetchProgress};

/// Receives acquisition events. Every method defaults to doing nothing.
#[cfg_attr(test, mockall::automock)]
pub trait FetchObserver: Send + Sync {
    fn on_host_attempt(&self, _model_id: &str, _host: &str) {}

    fn on_progress(&self, _model_id: &str, _progress: FetchProgress) {}

    fn on_host_failed(&self, _model_id: &str, _host: &str, _error: &DownloadError) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FetchObserver for NoopObserver {}
