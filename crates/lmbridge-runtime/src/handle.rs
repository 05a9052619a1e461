//! Owned wrappers around native engine handles.
//!
//! [`EngineHandle`] destroys the engine when the last owner drops it.
//! [`TaskGuard`] destroys its task exactly once, either explicitly through
//! [`TaskGuard::destroy`] or on drop, so every exit from a stream (end,
//! error, cancellation, or the consumer dropping it) releases the task.

use std::path::Path;
use std::sync::Arc;

use lmbridge_core::{EngineBackend, RawHandle};
use tracing::debug;

use crate::error::BridgeError;

pub struct EngineHandle {
    backend: Arc<dyn EngineBackend>,
    raw: RawHandle,
}

impl EngineHandle {
    /// Construct an engine, failing on the engine's zero handle.
    pub fn construct(
        backend: Arc<dyn EngineBackend>,
        model_root: &Path,
        library_path: &Path,
    ) -> Result<Self, BridgeError> {
        let raw = backend
            .construct(model_root, library_path)
            .ok_or_else(|| BridgeError::Construct {
                model_root: model_root.to_path_buf(),
                library_path: library_path.to_path_buf(),
            })?;
        debug!(engine = ?raw, root = %model_root.display(), "Engine created");
        Ok(Self { backend, raw })
    }

    /// Submit a request; the returned guard keeps the engine alive.
    pub fn start_task(self: &Arc<Self>, request_json: &str) -> Result<TaskGuard, BridgeError> {
        let task = self
            .backend
            .start_chat_task(self.raw, request_json)
            .ok_or(BridgeError::StartTask)?;
        debug!(engine = ?self.raw, task = ?task, "Chat task started");
        Ok(TaskGuard {
            engine: Arc::clone(self),
            task: Some(task),
        })
    }
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle").field("raw", &self.raw).finish()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        debug!(engine = ?self.raw, "Destroying engine");
        self.backend.destroy(self.raw);
    }
}

/// A running chat task.
#[derive(Debug)]
pub struct TaskGuard {
    engine: Arc<EngineHandle>,
    task: Option<RawHandle>,
}

impl TaskGuard {
    /// Next chunk, if any. Always `None` once destroyed.
    pub fn poll(&self) -> Option<String> {
        let task = self.task?;
        self.engine.backend.poll_chunk(self.engine.raw, task)
    }

    /// Release the task. Further calls are no-ops.
    pub fn destroy(&mut self) {
        if let Some(task) = self.task.take() {
            debug!(engine = ?self.engine.raw, task = ?task, "Destroying chat task");
            self.engine.backend.destroy_task(self.engine.raw, task);
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.destroy();
    }
}
