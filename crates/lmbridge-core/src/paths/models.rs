//! Model root resolution.
//!
//! The model root holds one directory per encoded model id plus the
//! engine's `hparams.json` and `workspace.json`.

use std::env;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable overriding the model root.
pub const MODEL_ROOT_ENV: &str = "LMBRIDGE_MODEL_ROOT";

/// How the model root was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRootSource {
    Explicit,
    EnvVar,
    Default,
}

#[derive(Debug, Clone)]
pub struct ModelRootResolution {
    pub path: PathBuf,
    pub source: ModelRootSource,
}

/// `<data_local_dir>/lmbridge/models`.
pub fn default_model_root() -> Result<PathBuf, PathError> {
    let data = dirs::data_local_dir().ok_or(PathError::NoDataDir)?;
    Ok(data.join("lmbridge").join("models"))
}

/// Resolve the model root from an explicit override, env var, or default.
///
/// Resolution order:
/// 1. Explicit path provided by caller
/// 2. `LMBRIDGE_MODEL_ROOT`
/// 3. [`default_model_root`]
pub fn resolve_model_root(explicit: Option<&Path>) -> Result<ModelRootResolution, PathError> {
    resolve_with_env(explicit, env::var(MODEL_ROOT_ENV).ok().as_deref())
}

fn resolve_with_env(
    explicit: Option<&Path>,
    env_value: Option<&str>,
) -> Result<ModelRootResolution, PathError> {
    if let Some(path) = explicit {
        if path.as_os_str().is_empty() {
            return Err(PathError::EmptyPath);
        }
        return Ok(ModelRootResolution {
            path: path.to_path_buf(),
            source: ModelRootSource::Explicit,
        });
    }

    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(ModelRootResolution {
            path: PathBuf::from(value),
            source: ModelRootSource::EnvVar,
        });
    }

    Ok(ModelRootResolution {
        path: default_model_root()?,
        source: ModelRootSource::Default,
    })
}
