//! Exit codes for failed commands.

use lmbridge_core::{ConfigError, DownloadError, PathError, PermissionError};
use lmbridge_download::ValidationError;
use lmbridge_runtime::BridgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// One or more model components are missing or incomplete.
    #[error("{count} model component(s) failed validation")]
    Invalid { count: usize },

    /// A model component has not been downloaded.
    #[error("Model not found locally: {0}")]
    NotFound(String),
}

/// Map an error to a process exit code (sysexits.h where one fits).
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<CliError>() {
            return match err {
                CliError::Invalid { .. } => 65, // EX_DATAERR
                CliError::NotFound(_) => 66,    // EX_NOINPUT
            };
        }
        if cause.is::<ValidationError>() {
            return 65;
        }
        if cause.is::<PermissionError>() || cause.is::<PathError>() {
            return 77; // EX_NOPERM
        }
        if cause.is::<ConfigError>() {
            return 78; // EX_CONFIG
        }
        if let Some(err) = cause.downcast_ref::<DownloadError>() {
            return match err {
                DownloadError::Cancelled => 130,
                DownloadError::Io { .. } => 74, // EX_IOERR
                _ => 69,                        // EX_UNAVAILABLE
            };
        }
        if let Some(err) = cause.downcast_ref::<BridgeError>() {
            return match err {
                BridgeError::Permission(_) => 77,
                BridgeError::Config(_) => 78,
                BridgeError::Download(DownloadError::Cancelled) => 130,
                BridgeError::Download(_) => 69,
                BridgeError::SessionBusy | BridgeError::DownloadInProgress => 75, // EX_TEMPFAIL
                _ => 70, // EX_SOFTWARE
            };
        }
    }
    1
}
