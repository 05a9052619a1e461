//! Native inference engine call contract.
//!
//! The engine is an opaque capability reached through integer handles. This
//! trait mirrors its five entry points one-to-one; ownership of the handles
//! (destroy exactly once, never use after destroy) is enforced by the
//! runtime crate's guard types, not here.

use std::fmt;
use std::num::NonZeroU64;
use std::path::Path;

/// An opaque, non-zero handle issued by the engine.
///
/// Zero is the engine's failure value and is never representable here.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawHandle(NonZeroU64);

impl RawHandle {
    /// Wrap a raw value, mapping the engine's `0` failure value to `None`.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawHandle({:#x})", self.0)
    }
}

/// The native engine's entry points.
///
/// All calls are synchronous and expected to return quickly; `poll_chunk`
/// in particular must not block waiting for tokens.
pub trait EngineBackend: Send + Sync {
    /// Construct an engine over `model_root`, loading native libraries from `library_path`.
    fn construct(&self, model_root: &Path, library_path: &Path) -> Option<RawHandle>;

    /// Submit a chat request (JSON) and obtain a task handle.
    fn start_chat_task(&self, engine: RawHandle, request_json: &str) -> Option<RawHandle>;

    /// Next available output for `task`. `None` or an empty string means no data yet.
    fn poll_chunk(&self, engine: RawHandle, task: RawHandle) -> Option<String>;

    fn destroy_task(&self, engine: RawHandle, task: RawHandle);

    fn destroy(&self, engine: RawHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_handle() {
        assert!(RawHandle::new(0).is_none());
        assert_eq!(RawHandle::new(42).map(RawHandle::get), Some(42));
    }

    #[test]
    fn debug_is_hex() {
        let handle = RawHandle::new(255).unwrap();
        assert_eq!(format!("{handle:?}"), "RawHandle(0xff)");
    }
}
