use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use super::{HyperParams, WorkspaceDoc};

pub const HPARAMS_FILE: &str = "hparams.json";
pub const WORKSPACE_FILE: &str = "workspace.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize defaults for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The two config documents under one model root.
#[derive(Debug, Clone)]
pub struct ConfigFiles {
    root: PathBuf,
}

impl ConfigFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn hparams_path(&self) -> PathBuf {
        self.root.join(HPARAMS_FILE)
    }

    #[must_use]
    pub fn workspace_path(&self) -> PathBuf {
        self.root.join(WORKSPACE_FILE)
    }

    /// Write default documents that do not exist yet.
    ///
    /// Returns the paths that were created. Existing files are left alone.
    pub fn ensure(&self) -> Result<Vec<PathBuf>, ConfigError> {
        fs::create_dir_all(&self.root).map_err(|source| ConfigError::Io {
            path: self.root.clone(),
            source,
        })?;

        let mut created = Vec::new();
        if write_if_absent(&self.hparams_path(), &HyperParams::default())? {
            created.push(self.hparams_path());
        }
        if write_if_absent(&self.workspace_path(), &WorkspaceDoc::default())? {
            created.push(self.workspace_path());
        }
        Ok(created)
    }

    pub fn load_hparams(&self) -> Result<HyperParams, ConfigError> {
        read_json(&self.hparams_path())
    }

    pub fn load_workspace(&self) -> Result<WorkspaceDoc, ConfigError> {
        read_json(&self.workspace_path())
    }
}

fn write_if_absent<T: Serialize>(path: &Path, value: &T) -> Result<bool, ConfigError> {
    if path.exists() {
        debug!(path = %path.display(), "Config file present");
        return Ok(false);
    }
    info!(path = %path.display(), "Config file not found, writing defaults");

    let body = serde_json::to_string_pretty(value).map_err(|source| ConfigError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let body = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&body).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ensure_writes_both_defaults_once() {
        let dir = tempdir().unwrap();
        let files = ConfigFiles::new(dir.path().join("root"));

        let created = files.ensure().unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(files.load_hparams().unwrap(), HyperParams::default());
        assert_eq!(files.load_workspace().unwrap().hparams_config, "hparams.json");

        assert!(files.ensure().unwrap().is_empty());
    }

    #[test]
    fn ensure_keeps_user_edits() {
        let dir = tempdir().unwrap();
        let files = ConfigFiles::new(dir.path());
        fs::write(files.hparams_path(), r#"{"n_threads": 2}"#).unwrap();

        let created = files.ensure().unwrap();
        assert_eq!(created, vec![files.workspace_path()]);
        assert_eq!(files.load_hparams().unwrap().n_threads, 2);
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    #[test]
    fn serialization_failure_is_not_reported_as_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.json");

        let err = write_if_absent(&path, &Unserializable).unwrap_err();
        assert!(matches!(err, ConfigError::Serialize { .. }));
        assert!(err.to_string().starts_with("Failed to serialize defaults"));
        assert!(!path.exists());
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let files = ConfigFiles::new(dir.path());
        fs::write(files.workspace_path(), "not json").unwrap();
        assert!(matches!(
            files.load_workspace(),
            Err(ConfigError::Parse { .. })
        ));
    }
}
