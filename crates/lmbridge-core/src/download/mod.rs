//! Download domain types.
//!
//! Shared by the fetcher and the fetch manager: the serializable error type
//! and the progress samples and results they produce.

mod errors;
mod types;

pub use errors::DownloadError;
pub use types::{FetchProgress, ResolvedModel};
