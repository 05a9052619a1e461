use serde::{Deserialize, Serialize};

use super::files::HPARAMS_FILE;

/// Contents of `workspace.json`.
///
/// Paths are relative to the model root. Empty model entries let the engine
/// pick the models named in each chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceDoc {
    pub executables: String,
    pub hparams_config: String,
    pub model_main: String,
    pub model_draft: String,
}

impl Default for WorkspaceDoc {
    fn default() -> Self {
        Self {
            executables: String::new(),
            hparams_config: HPARAMS_FILE.to_string(),
            model_main: String::new(),
            model_draft: String::new(),
        }
    }
}
