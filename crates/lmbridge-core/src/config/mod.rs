//! Engine configuration documents.
//!
//! The native engine reads `hparams.json` and `workspace.json` from the
//! model root. Both are written with fixed defaults on first run and never
//! overwritten afterwards, so hand edits survive.

mod files;
mod hparams;
mod workspace;

pub use files::{ConfigError, ConfigFiles, HPARAMS_FILE, WORKSPACE_FILE};
pub use hparams::{HyperParams, SamplerParams};
pub use workspace::WorkspaceDoc;
