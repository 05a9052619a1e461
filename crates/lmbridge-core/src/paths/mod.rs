//! Path utilities for the local model store.
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O

mod ensure;
mod error;
mod models;

pub use ensure::{ensure_directory, verify_writable};
pub use error::PathError;
pub use models::{
    MODEL_ROOT_ENV, ModelRootResolution, ModelRootSource, default_model_root, resolve_model_root,
};
