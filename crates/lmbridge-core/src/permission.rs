//! Storage access capability.
//!
//! Fetching and native construction both require storage access that is
//! granted outside this crate (a user prompt on mobile, a writable data
//! directory on desktop). Instead of an ambient "permission acquired" flag,
//! a gate hands out a [`StorageGrant`] and every operation that touches the
//! model store takes one by reference.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::paths::{PathError, ensure_directory};

#[derive(Debug, Error)]
pub enum PermissionError {
    /// The user or platform refused storage access.
    #[error("Storage access to {path} was not granted: {reason}")]
    Denied { path: PathBuf, reason: String },
}

impl From<PathError> for PermissionError {
    fn from(err: PathError) -> Self {
        let path = match &err {
            PathError::NotADirectory(p) => p.clone(),
            PathError::CreateFailed { path, .. } | PathError::NotWritable { path, .. } => {
                path.clone()
            }
            PathError::NoDataDir | PathError::EmptyPath => PathBuf::new(),
        };
        Self::Denied {
            path,
            reason: err.to_string(),
        }
    }
}

/// Proof that storage access to one model root was granted.
///
/// Can only be obtained from a [`PermissionGate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageGrant {
    root: PathBuf,
}

impl StorageGrant {
    /// The model root the grant covers.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local directory of one encoded model component.
    #[must_use]
    pub fn model_dir(&self, model_id: &str) -> PathBuf {
        self.root.join(model_id)
    }
}

/// Something that can grant storage access.
pub trait PermissionGate: Send + Sync {
    /// Request access, prompting if the platform needs to.
    fn request(&self) -> Result<StorageGrant, PermissionError>;
}

/// Grants access when the model root exists (or can be created) and is writable.
#[derive(Debug, Clone)]
pub struct WritableDirGate {
    root: PathBuf,
}

impl WritableDirGate {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PermissionGate for WritableDirGate {
    fn request(&self) -> Result<StorageGrant, PermissionError> {
        match ensure_directory(&self.root) {
            Ok(()) => {
                debug!(root = %self.root.display(), "Storage access granted");
                Ok(StorageGrant {
                    root: self.root.clone(),
                })
            }
            Err(err) => {
                warn!(root = %self.root.display(), error = %err, "Storage access denied");
                Err(err.into())
            }
        }
    }
}
