#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

mod config;
mod fetcher;
mod lease;
mod manager;
mod observer;
pub(crate) mod progress;
mod validate;

pub use config::FetchConfig;
pub use fetcher::FileFetcher;
pub use lease::{AcquisitionLease, AcquisitionLocks};
pub use manager::FetchManager;
pub use observer::{FetchObserver, NoopObserver};
pub use progress::{ProgressThrottle, format_speed};
pub use validate::ValidationError;

// Re-export core types for convenience
pub use lmbridge_core::{DownloadError, FetchProgress, ResolvedModel};

// Silence unused dev-dependency warnings
#[cfg(test)]
use bytes as _;
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tempfile as _;
