//! Host fallback behaviour of the fetch manager.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use lmbridge_core::{FetchProgress, ModelManifest, PermissionGate, WritableDirGate};
use lmbridge_download::{DownloadError, FetchConfig, FetchManager, FetchObserver};
use lmbridge_hf::HostConfig;
use lmbridge_hf::testing::{CannedResponse, FakeBackend};
use serde_json::json;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Recorder {
    attempts: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
    progress: Mutex<Vec<FetchProgress>>,
}

impl FetchObserver for Recorder {
    fn on_host_attempt(&self, _model_id: &str, host: &str) {
        self.attempts.lock().unwrap().push(host.to_string());
    }

    fn on_progress(&self, _model_id: &str, progress: FetchProgress) {
        self.progress.lock().unwrap().push(progress);
    }

    fn on_host_failed(&self, _model_id: &str, host: &str, _error: &DownloadError) {
        self.failures.lock().unwrap().push(host.to_string());
    }
}

fn manager(backend: FakeBackend) -> FetchManager<FakeBackend> {
    FetchManager::new(
        Arc::new(backend),
        HostConfig::new()
            .with_hosts(["https://primary.test", "https://mirror.test"])
            .with_index_delay(Duration::ZERO),
        FetchConfig::new()
            .with_progress_interval(Duration::from_millis(10))
            .with_manifest(ModelManifest::new(["model.json", "ggml/weights.gguf"])),
    )
}

#[tokio::test]
async fn mirror_used_when_primary_index_fails_midway() {
    let backend = FakeBackend::new()
        // Primary: root listing works, subdirectory listing fails.
        .with_json(
            "primary.test/api/models/PowerServe/m/tree/main",
            json!([
                {"type": "file", "size": 2, "path": "model.json"},
                {"type": "file", "size": 9, "path": "primary-only.bin"},
                {"type": "directory", "size": 0, "path": "ggml"}
            ]),
        )
        .with_response(
            "primary.test/api/models/PowerServe/m/tree/main/ggml",
            CannedResponse::Status(503),
        )
        // Mirror: complete listing.
        .with_json(
            "mirror.test/api/models/PowerServe/m/tree/main",
            json!([
                {"type": "file", "size": 2, "path": "model.json"},
                {"type": "directory", "size": 0, "path": "ggml"},
                {"type": "file", "size": 5, "path": ".gitattributes"}
            ]),
        )
        .with_json(
            "mirror.test/api/models/PowerServe/m/tree/main/ggml",
            json!([{"type": "file", "size": 4, "path": "ggml/weights.gguf"}]),
        )
        .with_response(
            "mirror.test/PowerServe/m/resolve/main/model.json",
            CannedResponse::bytes(&b"{}"[..]),
        )
        .with_response(
            "mirror.test/PowerServe/m/resolve/main/ggml/weights.gguf",
            CannedResponse::bytes(&b"GGUF"[..]),
        );

    let dir = tempfile::tempdir().unwrap();
    let grant = WritableDirGate::new(dir.path()).request().unwrap();
    let manager = manager(backend.clone());
    let recorder = Recorder::default();

    let path = manager
        .acquire(&grant, "m", &CancellationToken::new(), &recorder)
        .await
        .unwrap();

    assert_eq!(path, dir.path().join("m"));
    assert!(manager.validate_local(&grant, "m"));
    assert!(!path.join("primary-only.bin").exists());
    assert!(!path.join(".gitattributes").exists());

    // Nothing was transferred from the primary host.
    assert!(
        !backend
            .requests()
            .iter()
            .any(|u| u.starts_with("https://primary.test/PowerServe"))
    );

    assert_eq!(
        *recorder.attempts.lock().unwrap(),
        ["https://primary.test", "https://mirror.test"]
    );
    assert_eq!(*recorder.failures.lock().unwrap(), ["https://primary.test"]);

    let progress = recorder.progress.lock().unwrap();
    assert!(progress.iter().all(|p| p.percentage <= 100));
    assert_eq!(progress.last().map(|p| p.percentage), Some(100));
}

#[tokio::test]
async fn transfer_failure_on_primary_falls_back_to_mirror() {
    let listing = json!([{"type": "file", "size": 2, "path": "model.json"},
                         {"type": "file", "size": 4, "path": "ggml/weights.gguf"}]);
    let backend = FakeBackend::new()
        .with_json("primary.test/api/models", listing.clone())
        .with_json("mirror.test/api/models", listing)
        .with_response(
            "primary.test/PowerServe/m/resolve/main/model.json",
            CannedResponse::Status(500),
        )
        .with_response(
            "primary.test/PowerServe/m/resolve/main/ggml/weights.gguf",
            CannedResponse::bytes(&b"GGUF"[..]),
        )
        .with_response(
            "mirror.test/PowerServe/m/resolve/main/model.json",
            CannedResponse::bytes(&b"{}"[..]),
        )
        .with_response(
            "mirror.test/PowerServe/m/resolve/main/ggml/weights.gguf",
            CannedResponse::bytes(&b"GGUF"[..]),
        );

    let dir = tempfile::tempdir().unwrap();
    let grant = WritableDirGate::new(dir.path()).request().unwrap();
    let manager = manager(backend);

    let path = manager
        .acquire(&grant, "m", &CancellationToken::new(), &lmbridge_download::NoopObserver)
        .await
        .unwrap();

    assert_eq!(std::fs::read(path.join("model.json")).unwrap(), b"{}");
    assert!(manager.validate_local(&grant, "m"));
}

#[tokio::test]
async fn cancellation_does_not_fall_back() {
    let backend = FakeBackend::new().with_json(
        "api/models",
        json!([{"type": "file", "size": 2, "path": "model.json"}]),
    );
    let dir = tempfile::tempdir().unwrap();
    let grant = WritableDirGate::new(dir.path()).request().unwrap();
    let manager = manager(backend.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = manager
        .acquire(&grant, "m", &cancel, &lmbridge_download::NoopObserver)
        .await
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(!backend.requests().iter().any(|u| u.contains("mirror.test")));
}
