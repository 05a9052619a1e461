//! Local chat service.
//!
//! Runs the whole control flow of one chat exchange against the on-device
//! engine: storage permission, first-run configuration, model name
//! versioning, model acquisition, then the bridge. The engine itself is
//! created lazily on the first exchange, after storage access is granted.

use std::path::PathBuf;
use std::sync::Arc;

use async_stream::stream;
use futures_util::{Stream, StreamExt};
use lmbridge_core::{
    ChatCompletion, ChatCompletionChunk, ChatRequest, ConfigFiles, EngineBackend, NameCodec,
    PermissionGate, StorageGrant,
};
use lmbridge_download::{FetchManager, FetchObserver};
use lmbridge_hf::HttpBackend;
use tokio::sync::OnceCell;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::payload::build_request_json;

pub struct LocalChatService<B> {
    gate: Arc<dyn PermissionGate>,
    manager: Arc<FetchManager<B>>,
    engine: Arc<dyn EngineBackend>,
    library_path: PathBuf,
    codec: NameCodec,
    config: BridgeConfig,
    bridge: OnceCell<Bridge>,
}

impl<B: HttpBackend + 'static> LocalChatService<B> {
    pub fn new(
        gate: Arc<dyn PermissionGate>,
        manager: Arc<FetchManager<B>>,
        engine: Arc<dyn EngineBackend>,
        library_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gate,
            manager,
            engine,
            library_path: library_path.into(),
            codec: NameCodec::for_build(),
            config: BridgeConfig::default(),
            bridge: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn with_codec(mut self, codec: NameCodec) -> Self {
        self.codec = codec;
        self
    }

    #[must_use]
    pub const fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn codec(&self) -> &NameCodec {
        &self.codec
    }

    /// Permission, configuration, engine and model, in that order.
    ///
    /// Returns the bridge and the local model path(s) for the request.
    async fn prepare(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
        observer: &dyn FetchObserver,
    ) -> Result<(&Bridge, String), BridgeError> {
        let grant = self.gate.request()?;
        let created = ConfigFiles::new(grant.root()).ensure()?;
        if !created.is_empty() {
            info!(count = created.len(), "Wrote default engine configuration");
        }
        let bridge = self.bridge(&grant).await?;

        let model_id = self.codec.encode(&request.model);
        debug!(model = %request.model, versioned = %model_id, "Preparing model");
        let model_path = self
            .manager
            .fetch_model(&grant, &model_id, cancel, observer)
            .await?;
        Ok((bridge, model_path))
    }

    async fn bridge(&self, grant: &StorageGrant) -> Result<&Bridge, BridgeError> {
        self.bridge
            .get_or_try_init(|| async {
                Bridge::new(
                    Arc::clone(&self.engine),
                    grant.root(),
                    &self.library_path,
                    self.config,
                )
            })
            .await
    }

    /// Stream completion chunks for `request`.
    ///
    /// Refuses to start while any model download is running. Cancelling
    /// `cancel` aborts model acquisition or ends the chat stream.
    pub fn chat_stream<'a>(
        &'a self,
        request: ChatRequest,
        cancel: CancellationToken,
        observer: &'a dyn FetchObserver,
    ) -> impl Stream<Item = Result<ChatCompletionChunk, BridgeError>> + 'a {
        stream! {
            if self.manager.locks().any_active() {
                yield Err(BridgeError::DownloadInProgress);
                return;
            }
            let (bridge, model_path) = match self.prepare(&request, &cancel, observer).await {
                Ok(prepared) => prepared,
                Err(err) => {
                    yield Err(err);
                    return;
                }
            };

            sleep(self.config.startup_delay).await;
            let payload = match build_request_json(&request, Some(&model_path), true) {
                Ok(payload) => payload,
                Err(err) => {
                    yield Err(BridgeError::from(err));
                    return;
                }
            };
            debug!(payload = %payload, "Submitting chat request");

            let mut chunks = std::pin::pin!(bridge.stream::<ChatCompletionChunk>(payload, cancel));
            while let Some(chunk) = chunks.next().await {
                yield chunk;
            }
        }
    }

    /// Single-shot completion for `request`.
    pub async fn chat(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
        observer: &dyn FetchObserver,
    ) -> Result<ChatCompletion, BridgeError> {
        let (bridge, model_path) = self.prepare(request, cancel, observer).await?;
        let payload = build_request_json(request, Some(&model_path), false)?;
        bridge.complete(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedEngine;
    use lmbridge_core::{ChatMessage, ModelManifest, PermissionError, WritableDirGate};
    use lmbridge_download::{FetchConfig, NoopObserver};
    use lmbridge_hf::HostConfig;
    use lmbridge_hf::testing::{CannedResponse, FakeBackend};
    use serde_json::{Value, json};
    use std::time::Duration;
    use tempfile::tempdir;

    const SUFFIX: &str = "-PowerServe-QNN29-8G4";

    struct DeniedGate;

    impl PermissionGate for DeniedGate {
        fn request(&self) -> Result<StorageGrant, PermissionError> {
            Err(PermissionError::Denied {
                path: PathBuf::from("/sdcard"),
                reason: "user refused".into(),
            })
        }
    }

    fn backend() -> FakeBackend {
        FakeBackend::new()
            .with_json(
                "primary/api/models/PowerServe/qwen-PowerServe-QNN29-8G4/tree/main",
                json!([{"type": "file", "size": 2, "path": "model.json"}]),
            )
            .with_response(
                "primary/PowerServe/qwen-PowerServe-QNN29-8G4/resolve/main/model.json",
                CannedResponse::bytes(&b"{}"[..]),
            )
    }

    fn service(
        gate: Arc<dyn PermissionGate>,
        backend: FakeBackend,
        engine: &Arc<ScriptedEngine>,
    ) -> LocalChatService<FakeBackend> {
        let manager = FetchManager::new(
            Arc::new(backend),
            HostConfig::new()
                .with_hosts(["https://primary", "https://mirror"])
                .with_index_delay(Duration::ZERO),
            FetchConfig::new()
                .with_progress_interval(Duration::from_millis(10))
                .with_manifest(ModelManifest::new(["model.json"])),
        );
        LocalChatService::new(gate, Arc::new(manager), engine.clone(), "/lib")
            .with_codec(NameCodec::with_suffix(SUFFIX))
            .with_config(
                BridgeConfig::new()
                    .with_poll_interval(Duration::from_millis(1))
                    .with_startup_delay(Duration::ZERO),
            )
    }

    fn request() -> ChatRequest {
        ChatRequest::new("qwen", vec![ChatMessage::user("hello")])
    }

    #[tokio::test]
    async fn streams_after_downloading_the_model() {
        let dir = tempdir().unwrap();
        let engine = Arc::new(ScriptedEngine::new().with_chunks([
            r#"data:{"choices":[{"index":0,"delta":{"content":"Hi"}}]}"#,
            "data: [DONE]",
        ]));
        let service = service(Arc::new(WritableDirGate::new(dir.path())), backend(), &engine);

        let chunks: Vec<_> = service
            .chat_stream(request(), CancellationToken::new(), &NoopObserver)
            .collect()
            .await;

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap().text(), "Hi");

        let model_dir = dir.path().join(format!("qwen{SUFFIX}"));
        assert!(model_dir.join("model.json").is_file());
        assert!(dir.path().join("hparams.json").is_file());
        assert!(dir.path().join("workspace.json").is_file());

        let sent: Value = serde_json::from_str(&engine.requests()[0]).unwrap();
        assert_eq!(sent["model"], model_dir.display().to_string());
        assert_eq!(sent["stream"], true);
        assert_eq!(sent["messages"][0]["content"], "hello");

        let calls = engine.calls();
        assert_eq!(calls.construct, 1);
        assert_eq!(calls.destroy_task, 1);
    }

    #[tokio::test]
    async fn engine_is_created_once() {
        let dir = tempdir().unwrap();
        let engine = Arc::new(ScriptedEngine::new().with_chunks([
            "data: [DONE]",
            "data: [DONE]",
        ]));
        let service = service(Arc::new(WritableDirGate::new(dir.path())), backend(), &engine);

        for _ in 0..2 {
            let chunks: Vec<_> = service
                .chat_stream(request(), CancellationToken::new(), &NoopObserver)
                .collect()
                .await;
            assert!(chunks.is_empty());
        }
        assert_eq!(engine.calls().construct, 1);
        assert_eq!(engine.calls().start, 2);
    }

    #[tokio::test]
    async fn denied_permission_touches_nothing() {
        let engine = Arc::new(ScriptedEngine::new());
        let backend = backend();
        let service = service(Arc::new(DeniedGate), backend.clone(), &engine);

        let chunks: Vec<_> = service
            .chat_stream(request(), CancellationToken::new(), &NoopObserver)
            .collect()
            .await;

        assert!(matches!(chunks.as_slice(), [Err(BridgeError::Permission(_))]));
        assert_eq!(engine.calls(), crate::testing::EngineCalls::default());
        assert!(backend.requests().is_empty());
    }

    #[tokio::test]
    async fn refuses_while_a_download_runs() {
        let dir = tempdir().unwrap();
        let engine = Arc::new(ScriptedEngine::new());
        let service = service(Arc::new(WritableDirGate::new(dir.path())), backend(), &engine);
        let _lease = service.manager.locks().try_lease("other").unwrap();

        let chunks: Vec<_> = service
            .chat_stream(request(), CancellationToken::new(), &NoopObserver)
            .collect()
            .await;

        assert!(matches!(chunks.as_slice(), [Err(BridgeError::DownloadInProgress)]));
        assert_eq!(engine.calls().construct, 0);
    }

    #[tokio::test]
    async fn construct_failure_is_fatal() {
        let dir = tempdir().unwrap();
        let engine = Arc::new(ScriptedEngine::new().failing_construct());
        let service = service(Arc::new(WritableDirGate::new(dir.path())), backend(), &engine);

        let err = service
            .chat(&request(), &CancellationToken::new(), &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Construct { ref model_root, .. } if model_root == dir.path()));
        assert!(!dir.path().join(format!("qwen{SUFFIX}")).exists());
    }

    #[tokio::test]
    async fn single_shot_uses_existing_model() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join(format!("qwen{SUFFIX}"));
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join("model.json"), b"{}").unwrap();

        let engine = Arc::new(ScriptedEngine::new().with_chunks([
            r#"{"id":"c1","choices":[{"index":0,"message":{"role":"assistant","content":"Hello"}}]}"#,
        ]));
        let backend = FakeBackend::new();
        let service = service(Arc::new(WritableDirGate::new(dir.path())), backend.clone(), &engine);

        let completion = service
            .chat(&request(), &CancellationToken::new(), &NoopObserver)
            .await
            .unwrap();

        assert_eq!(completion.first_content(), Some("Hello"));
        assert!(backend.requests().is_empty());
        let sent: Value = serde_json::from_str(&engine.requests()[0]).unwrap();
        assert_eq!(sent["stream"], false);
        assert_eq!(engine.calls().poll, 1);
    }

    #[tokio::test]
    async fn failed_download_is_reported() {
        let dir = tempdir().unwrap();
        let engine = Arc::new(ScriptedEngine::new());
        let service = service(Arc::new(WritableDirGate::new(dir.path())), FakeBackend::new(), &engine);

        let err = service
            .chat(&request(), &CancellationToken::new(), &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Download(lmbridge_core::DownloadError::AllHostsFailed { .. })
        ));
        assert_eq!(engine.calls().start, 0);
    }
}
