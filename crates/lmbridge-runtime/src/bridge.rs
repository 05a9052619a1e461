//! Inference session bridge.
//!
//! One [`Bridge`] owns one native engine. Each chat exchange starts a task,
//! pulls chunks at a fixed cadence and exposes them as an async stream.
//! Only one exchange runs at a time; a second caller gets
//! [`BridgeError::SessionBusy`] instead of queueing.

use std::path::Path;
use std::sync::Arc;

use async_stream::stream;
use futures_util::Stream;
use lmbridge_core::EngineBackend;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::frame::Frame;
use crate::handle::EngineHandle;

#[derive(Debug, Clone)]
pub struct Bridge {
    engine: Arc<EngineHandle>,
    session: Arc<Mutex<()>>,
    config: BridgeConfig,
}

impl Bridge {
    /// Construct the engine. Failure here is fatal for this bridge.
    pub fn new(
        backend: Arc<dyn EngineBackend>,
        model_root: &Path,
        library_path: &Path,
        config: BridgeConfig,
    ) -> Result<Self, BridgeError> {
        let engine = EngineHandle::construct(backend, model_root, library_path)?;
        Ok(Self {
            engine: Arc::new(engine),
            session: Arc::new(Mutex::new(())),
            config,
        })
    }

    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Whether a chat exchange is running.
    pub fn is_busy(&self) -> bool {
        self.session.try_lock().is_err()
    }

    fn claim_session(&self) -> Result<OwnedMutexGuard<()>, BridgeError> {
        Arc::clone(&self.session)
            .try_lock_owned()
            .map_err(|_| BridgeError::SessionBusy)
    }

    /// Stream decoded deltas for `request_json`.
    ///
    /// Ends after the terminal sentinel, after the first error, or when
    /// `cancel` fires (checked once per poll interval). The task is destroyed
    /// exactly once on each of these paths and when the stream is dropped early.
    pub fn stream<T>(
        &self,
        request_json: String,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<T, BridgeError>> + Send + use<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let session = self.claim_session();
        let poll_interval = self.config.poll_interval;

        stream! {
            let _session = match session {
                Ok(guard) => guard,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };
            let mut task = match engine.start_task(&request_json) {
                Ok(task) => task,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };

            loop {
                let cancelled = tokio::select! {
                    biased;
                    () = cancel.cancelled() => true,
                    () = sleep(poll_interval) => false,
                };
                if cancelled {
                    debug!("Chat stream cancelled");
                    break;
                }

                let Some(chunk) = task.poll() else { continue };
                match Frame::parse(&chunk) {
                    Frame::Pending => {}
                    Frame::Done => {
                        debug!("Chat stream finished");
                        break;
                    }
                    Frame::Data(payload) => {
                        debug!(chunk = %chunk, "Received chunk");
                        match serde_json::from_str::<T>(payload) {
                            Ok(delta) => yield Ok(delta),
                            Err(err) => {
                                info!(chunk = %chunk, error = %err, "Dropping undecodable chunk");
                            }
                        }
                    }
                    Frame::Error(frame) => {
                        warn!(code = frame.code, kind = %frame.kind, message = %frame.message, "Engine reported an error");
                        task.destroy();
                        yield Err(BridgeError::from(frame));
                        return;
                    }
                    Frame::Unrecognized(raw) => {
                        error!(chunk = %raw, "Unknown response");
                    }
                }
            }
            task.destroy();
        }
    }

    /// Run `request_json` as a single-shot exchange.
    ///
    /// Polls exactly once. An empty or undecodable result yields `T::default()`.
    pub fn complete<T>(&self, request_json: &str) -> Result<T, BridgeError>
    where
        T: DeserializeOwned + Default,
    {
        let _session = self.claim_session()?;
        let mut task = self.engine.start_task(request_json)?;
        let chunk = task.poll();
        task.destroy();

        let Some(chunk) = chunk.filter(|c| !c.is_empty()) else {
            debug!("Single-shot exchange returned nothing");
            return Ok(T::default());
        };
        Ok(serde_json::from_str(&chunk).unwrap_or_else(|err| {
            warn!(chunk = %chunk, error = %err, "Undecodable single-shot response");
            T::default()
        }))
    }
}
