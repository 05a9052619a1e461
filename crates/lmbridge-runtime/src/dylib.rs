//! Engine backend over a dynamically loaded native library.
//!
//! The library must export the C entry points listed in the crate README.
//! Handles cross the boundary as `u64`; strings returned by
//! `powerserve_try_fetch_result` are owned by the library and handed back
//! through `powerserve_free_string`.

#![allow(unsafe_code)]

use std::ffi::{CStr, CString, c_char};
use std::path::{Path, PathBuf};

use libloading::Library;
use lmbridge_core::{EngineBackend, RawHandle};
use tracing::{debug, warn};

use crate::error::BridgeError;

type CreateFn = unsafe extern "C" fn(*const c_char, *const c_char) -> u64;
type DestroyFn = unsafe extern "C" fn(u64);
type ChatCompletionFn = unsafe extern "C" fn(u64, *const c_char) -> u64;
type TryFetchResultFn = unsafe extern "C" fn(u64, u64) -> *mut c_char;
type FreeStringFn = unsafe extern "C" fn(*mut c_char);
type DestroyResponseFn = unsafe extern "C" fn(u64, u64);

pub struct DylibEngine {
    path: PathBuf,
    create: CreateFn,
    destroy: DestroyFn,
    chat_completion: ChatCompletionFn,
    try_fetch_result: TryFetchResultFn,
    free_string: FreeStringFn,
    destroy_response: DestroyResponseFn,
    // Declared last so the symbols above never outlive it.
    _library: Library,
}

impl DylibEngine {
    /// Load the engine library at `path` and resolve every entry point.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, BridgeError> {
        let path = path.into();
        let err = |source| BridgeError::Library {
            path: path.clone(),
            source,
        };

        // SAFETY: loading runs the library's initializers; the caller chooses
        // which library to trust.
        let library = unsafe { Library::new(&path) }.map_err(err)?;

        // SAFETY: the signatures match the exported C declarations, and the
        // copied function pointers are only called while `library` is alive.
        let (create, destroy, chat_completion, try_fetch_result, free_string, destroy_response) = unsafe {
            let create: CreateFn = *library.get(b"powerserve_create\0").map_err(err)?;
            let destroy: DestroyFn = *library.get(b"powerserve_destroy\0").map_err(err)?;
            let chat_completion: ChatCompletionFn =
                *library.get(b"powerserve_chat_completion\0").map_err(err)?;
            let try_fetch_result: TryFetchResultFn =
                *library.get(b"powerserve_try_fetch_result\0").map_err(err)?;
            let free_string: FreeStringFn = *library.get(b"powerserve_free_string\0").map_err(err)?;
            let destroy_response: DestroyResponseFn =
                *library.get(b"powerserve_destroy_response\0").map_err(err)?;
            (create, destroy, chat_completion, try_fetch_result, free_string, destroy_response)
        };

        let engine = Self {
            path,
            create,
            destroy,
            chat_completion,
            try_fetch_result,
            free_string,
            destroy_response,
            _library: library,
        };
        debug!(path = %engine.path.display(), "Engine library loaded");
        Ok(engine)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for DylibEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DylibEngine").field("path", &self.path).finish_non_exhaustive()
    }
}

fn path_to_cstring(path: &Path) -> Option<CString> {
    CString::new(path.to_string_lossy().into_owned())
        .inspect_err(|_| warn!(path = %path.display(), "Path contains a NUL byte"))
        .ok()
}

impl EngineBackend for DylibEngine {
    fn construct(&self, model_root: &Path, library_path: &Path) -> Option<RawHandle> {
        let model_root = path_to_cstring(model_root)?;
        let library_path = path_to_cstring(library_path)?;
        // SAFETY: both pointers are valid NUL-terminated strings for the call.
        let raw = unsafe { (self.create)(model_root.as_ptr(), library_path.as_ptr()) };
        RawHandle::new(raw)
    }

    fn start_chat_task(&self, engine: RawHandle, request_json: &str) -> Option<RawHandle> {
        let request = CString::new(request_json)
            .inspect_err(|_| warn!("Request contains a NUL byte"))
            .ok()?;
        // SAFETY: `engine` came from `create` and has not been destroyed.
        let raw = unsafe { (self.chat_completion)(engine.get(), request.as_ptr()) };
        RawHandle::new(raw)
    }

    fn poll_chunk(&self, engine: RawHandle, task: RawHandle) -> Option<String> {
        // SAFETY: both handles are live; a non-null result is a NUL-terminated
        // string owned by the library until passed to `free_string`.
        unsafe {
            let ptr = (self.try_fetch_result)(engine.get(), task.get());
            if ptr.is_null() {
                return None;
            }
            let chunk = CStr::from_ptr(ptr).to_string_lossy().into_owned();
            (self.free_string)(ptr);
            Some(chunk)
        }
    }

    fn destroy_task(&self, engine: RawHandle, task: RawHandle) {
        // SAFETY: the task guard calls this once per live task.
        unsafe { (self.destroy_response)(engine.get(), task.get()) }
    }

    fn destroy(&self, engine: RawHandle) {
        // SAFETY: the engine handle calls this once, after its last task.
        unsafe { (self.destroy)(engine.get()) }
    }
}
