//! Local model validation.

use std::path::{Path, PathBuf};

use lmbridge_core::ModelManifest;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A manifest-listed file is absent.
    #[error("Model file {file} missing under {root}")]
    MissingFile { root: PathBuf, file: PathBuf },
}

/// Check every manifest file under `root`, stopping at the first missing one.
///
/// An empty manifest always passes.
pub(crate) fn check_manifest(root: &Path, manifest: &ModelManifest) -> Result<(), ValidationError> {
    if let Some(file) = manifest.first_missing(root) {
        warn!(root = %root.display(), file = %file.display(), "Model file missing");
        return Err(ValidationError::MissingFile {
            root: root.to_path_buf(),
            file,
        });
    }
    debug!(root = %root.display(), "All manifest files present");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reports_first_missing_file() {
        let dir = tempdir().unwrap();
        let manifest = ModelManifest::new(["a", "b"]);
        fs::write(dir.path().join("b"), b"").unwrap();

        assert_eq!(
            check_manifest(dir.path(), &manifest),
            Err(ValidationError::MissingFile {
                root: dir.path().to_path_buf(),
                file: dir.path().join("a"),
            })
        );
    }

    #[test]
    fn missing_directory_fails_on_first_file() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("absent");
        assert!(matches!(
            check_manifest(&root, &ModelManifest::default()),
            Err(ValidationError::MissingFile { file, .. }) if file == root.join("model.json")
        ));
    }

    #[test]
    fn empty_manifest_passes() {
        let dir = tempdir().unwrap();
        assert_eq!(check_manifest(dir.path(), &ModelManifest::empty()), Ok(()));
    }
}
