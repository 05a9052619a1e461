#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod config;
mod error;
mod http;
mod models;
mod resolver;
mod url;

// ============================================================================
// Public API
// ============================================================================

pub use config::{HostConfig, MIRROR_HOST, PRIMARY_HOST};
pub use error::{HfError, HfResult};
pub use http::{ByteStream, Download, HttpBackend, ReqwestBackend};
pub use models::{EntryKind, IndexEntry};
pub use resolver::IndexResolver;
pub use url::{HostUrls, build_file_url, build_resolve_base, build_tree_url};

#[cfg(any(test, feature = "test-utils"))]
pub use http::testing;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
