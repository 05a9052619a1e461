//! Download error types.
//!
//! Serializable so the CLI and any embedding application can report them
//! without holding on to `std::io::Error` or transport errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for model acquisition.
#[derive(Clone, Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DownloadError {
    /// I/O error during file operations.
    #[error("I/O error ({kind}): {message}")]
    Io {
        /// The kind of I/O error (e.g., "`NotFound`", "`PermissionDenied`").
        kind: String,
        /// Detailed error message.
        message: String,
    },

    /// Network/HTTP error during a transfer or index fetch.
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_code: Option<u16>,
    },

    /// Model or file not found on the remote host.
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The remote index could not be expanded into a file list.
    #[error("Resolution failed: {message}")]
    ResolutionFailed { message: String },

    /// Download was cancelled by the caller.
    #[error("Download cancelled")]
    Cancelled,

    /// Another acquisition of the same model is running.
    #[error("Already in progress: {model_id}")]
    AlreadyInProgress { model_id: String },

    /// Every configured host was tried and failed.
    #[error("Failed to acquire {model_id} from any host ({attempts} attempted): {last_error}")]
    AllHostsFailed {
        model_id: String,
        attempts: usize,
        last_error: String,
    },

    /// General/uncategorized error.
    #[error("{message}")]
    Other { message: String },
}

impl DownloadError {
    /// Create an I/O error from kind and message strings.
    pub fn io(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error from a `std::io::Error`.
    #[must_use]
    pub fn from_io_error(err: &std::io::Error) -> Self {
        let kind = err.kind();
        Self::Io {
            kind: format!("{kind:?}"),
            message: err.to_string(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn network_with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self::Network {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn resolution_failed(message: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            message: message.into(),
        }
    }

    pub fn already_in_progress(model_id: impl Into<String>) -> Self {
        Self::AlreadyInProgress {
            model_id: model_id.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether this error came from the caller cancelling.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether trying another host could help.
    #[must_use]
    pub const fn is_host_specific(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::NotFound { .. } | Self::ResolutionFailed { .. }
        )
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io_error(&err)
    }
}
