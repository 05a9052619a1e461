//! Scripted engine for tests.
//!
//! Replays a fixed list of chunks from `poll_chunk` and counts every call,
//! so tests can assert that tasks and engines are destroyed exactly once.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lmbridge_core::{EngineBackend, RawHandle};

const ENGINE_HANDLE: u64 = 0x1000;

/// Number of calls made to each entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCalls {
    pub construct: usize,
    pub start: usize,
    pub poll: usize,
    pub destroy_task: usize,
    pub destroy: usize,
}

#[derive(Debug, Default)]
struct State {
    script: VecDeque<Option<String>>,
    requests: Vec<String>,
    calls: EngineCalls,
    next_task: u64,
}

/// An [`EngineBackend`] that replays scripted chunks.
///
/// Once the script runs out every poll returns `None`.
#[derive(Debug)]
pub struct ScriptedEngine {
    construct_ok: bool,
    start_ok: bool,
    state: Mutex<State>,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            construct_ok: true,
            start_ok: true,
            state: Mutex::new(State::default()),
        }
    }

    /// Queue chunks returned by successive polls.
    #[must_use]
    pub fn with_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock()
            .script
            .extend(chunks.into_iter().map(|c| Some(c.into())));
        self
    }

    /// Queue a poll that returns no string at all.
    #[must_use]
    pub fn with_missing_chunk(self) -> Self {
        self.lock().script.push_back(None);
        self
    }

    #[must_use]
    pub const fn failing_construct(mut self) -> Self {
        self.construct_ok = false;
        self
    }

    #[must_use]
    pub const fn failing_start(mut self) -> Self {
        self.start_ok = false;
        self
    }

    pub fn calls(&self) -> EngineCalls {
        self.lock().calls
    }

    /// Request payloads received by `start_chat_task`, in order.
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EngineBackend for ScriptedEngine {
    fn construct(&self, _model_root: &Path, _library_path: &Path) -> Option<RawHandle> {
        self.lock().calls.construct += 1;
        if self.construct_ok {
            RawHandle::new(ENGINE_HANDLE)
        } else {
            None
        }
    }

    fn start_chat_task(&self, _engine: RawHandle, request_json: &str) -> Option<RawHandle> {
        let mut state = self.lock();
        state.calls.start += 1;
        state.requests.push(request_json.to_string());
        if !self.start_ok {
            return None;
        }
        state.next_task += 1;
        RawHandle::new(ENGINE_HANDLE + state.next_task)
    }

    fn poll_chunk(&self, _engine: RawHandle, _task: RawHandle) -> Option<String> {
        let mut state = self.lock();
        state.calls.poll += 1;
        state.script.pop_front().flatten()
    }

    fn destroy_task(&self, _engine: RawHandle, _task: RawHandle) {
        self.lock().calls.destroy_task += 1;
    }

    fn destroy(&self, _engine: RawHandle) {
        self.lock().calls.destroy += 1;
    }
}
