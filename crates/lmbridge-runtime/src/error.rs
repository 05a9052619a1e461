//! Errors raised by the inference bridge and chat service.

use std::path::PathBuf;

use lmbridge_core::{ConfigError, DownloadError, PermissionError};
use thiserror::Error;

use crate::frame::EngineErrorFrame;

#[derive(Debug, Error)]
pub enum BridgeError {
    // === Native engine ===
    /// The engine returned a zero handle on construction.
    #[error("Failed to create engine for {model_root} (native libraries in {library_path})")]
    Construct {
        model_root: PathBuf,
        library_path: PathBuf,
    },

    /// The engine refused the chat request.
    #[error("Failed to create chat task")]
    StartTask,

    /// The engine reported an error frame mid-stream.
    #[error("Receive error[{kind}]: {message}")]
    Engine {
        code: i64,
        message: String,
        kind: String,
    },

    /// The engine library could not be loaded or lacks a required symbol.
    #[error("Failed to load engine library {path}: {source}")]
    Library {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    // === Session ===
    /// A chat is already streaming on this engine.
    #[error("Another chat session is still running")]
    SessionBusy,

    /// A model download is still running.
    #[error("There is a model being downloaded, please wait")]
    DownloadInProgress,

    // === Payload ===
    /// A request or response payload could not be (de)serialized.
    #[error("Invalid engine payload: {0}")]
    Protocol(#[from] serde_json::Error),

    // === Preparation ===
    #[error(transparent)]
    Permission(#[from] PermissionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl From<EngineErrorFrame> for BridgeError {
    fn from(frame: EngineErrorFrame) -> Self {
        Self::Engine {
            code: frame.code,
            message: frame.message,
            kind: frame.kind,
        }
    }
}

impl BridgeError {
    /// Whether retrying after user action (granting storage access) may succeed.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Permission(_) | Self::SessionBusy | Self::DownloadInProgress
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_message() {
        let err = BridgeError::from(EngineErrorFrame {
            code: 500,
            message: "oom".into(),
            kind: "server_error".into(),
        });
        assert_eq!(err.to_string(), "Receive error[server_error]: oom");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn permission_is_recoverable() {
        let err = BridgeError::from(PermissionError::Denied {
            path: PathBuf::from("/models"),
            reason: "no".into(),
        });
        assert!(err.is_recoverable());
    }
}
