#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod config;
pub mod domain;
pub mod download;
pub mod paths;
pub mod permission;
pub mod ports;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ConfigFiles, HyperParams, SamplerParams, WorkspaceDoc};
pub use domain::{
    ChatChoice, ChatChunkChoice, ChatCompletion, ChatCompletionChunk, ChatDelta, ChatMessage,
    ChatRequest, MessageRole, ModelManifest, NameCodec, Usage,
};
pub use download::{DownloadError, FetchProgress, ResolvedModel};
pub use paths::{PathError, ensure_directory, resolve_model_root, verify_writable};
pub use permission::{PermissionError, PermissionGate, StorageGrant, WritableDirGate};
pub use ports::{EngineBackend, RawHandle};

#[cfg(test)]
use tempfile as _;
