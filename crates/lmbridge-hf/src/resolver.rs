//! Repository index resolution.
//!
//! Expands a repository tree listing into the flat list of file paths it
//! contains, one batch per listed directory, breadth first.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use futures_util::Stream;
use tracing::{debug, warn};

use url::Url;

use crate::error::{HfError, HfResult};
use crate::http::HttpBackend;
use crate::models::IndexEntry;
use crate::url::build_file_url;

/// Breadth-first index resolver.
pub struct IndexResolver<B> {
    backend: Arc<B>,
    delay: Duration,
}

impl<B> Clone for IndexResolver<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            delay: self.delay,
        }
    }
}

impl<B: HttpBackend + 'static> IndexResolver<B> {
    /// `delay` is inserted before every index request after the first.
    pub const fn new(backend: Arc<B>, delay: Duration) -> Self {
        Self { backend, delay }
    }

    /// Resolve every file path reachable from `index_base`.
    ///
    /// The first batch holds the files listed directly at `index_base`; each
    /// following batch holds the files of one directory, in discovery order.
    /// The first error ends the stream; batches already yielded are not
    /// retracted, so callers that need all-or-nothing must collect first.
    pub fn resolve(&self, index_base: impl Into<String>) -> impl Stream<Item = HfResult<Vec<String>>> {
        let backend = Arc::clone(&self.backend);
        let delay = self.delay;
        let index_base = index_base.into();

        stream! {
            let mut pending: VecDeque<Option<String>> = VecDeque::from([None]);
            let mut first = true;

            while let Some(dir) = pending.pop_front() {
                if !first && !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                first = false;

                let url = match &dir {
                    None => Url::parse(&index_base).map_err(HfError::from),
                    Some(path) => build_file_url(&index_base, path),
                };
                let url = match url {
                    Ok(url) => url,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let entries: Vec<IndexEntry> = match backend.get_json(&url).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        warn!(%url, error = %e, "Index fetch failed");
                        yield Err(e);
                        return;
                    }
                };

                let mut files = Vec::new();
                for entry in entries {
                    if entry.is_file() {
                        files.push(entry.path);
                    } else if entry.is_directory() {
                        pending.push_back(Some(entry.path));
                    }
                }

                debug!(
                    directory = dir.as_deref().unwrap_or("/"),
                    files = files.len(),
                    queued = pending.len(),
                    "Index batch resolved"
                );
                yield Ok(files);
            }
        }
    }

    /// Resolve everything, failing if any index request fails.
    pub async fn resolve_all(&self, index_base: impl Into<String>) -> HfResult<Vec<String>> {
        use futures_util::StreamExt;

        let stream = self.resolve(index_base);
        futures_util::pin_mut!(stream);

        let mut all = Vec::new();
        while let Some(batch) = stream.next().await {
            all.extend(batch?);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use futures_util::StreamExt;
    use serde_json::json;

    const BASE: &str = "https://h/api/models/PowerServe/m/tree/main";

    fn resolver(backend: FakeBackend) -> IndexResolver<FakeBackend> {
        IndexResolver::new(Arc::new(backend), Duration::ZERO)
    }

    fn tree() -> FakeBackend {
        FakeBackend::new()
            .with_json(
                "tree/main",
                json!([
                    {"type": "file", "size": 10, "path": "model.json"},
                    {"type": "directory", "size": 0, "path": "ggml"},
                    {"type": "directory", "size": 0, "path": "qnn"},
                    {"type": "file", "size": 20, "path": "vocab.gguf"}
                ]),
            )
            .with_json(
                "tree/main/ggml",
                json!([
                    {"type": "file", "size": 30, "path": "ggml/weights.gguf"},
                    {"type": "directory", "size": 0, "path": "ggml/extra"}
                ]),
            )
            .with_json(
                "tree/main/qnn",
                json!([{"type": "file", "size": 5, "path": "qnn/config.json"}]),
            )
            .with_json(
                "tree/main/ggml/extra",
                json!([{"type": "file", "size": 1, "path": "ggml/extra/a.bin"}]),
            )
    }

    #[tokio::test]
    async fn yields_root_files_first_then_directories_breadth_first() {
        let backend = tree();
        let batches: Vec<_> = resolver(backend.clone())
            .resolve(BASE)
            .map(Result::unwrap)
            .collect()
            .await;

        assert_eq!(
            batches,
            vec![
                vec!["model.json".to_string(), "vocab.gguf".to_string()],
                vec!["ggml/weights.gguf".to_string()],
                vec!["qnn/config.json".to_string()],
                vec!["ggml/extra/a.bin".to_string()],
            ]
        );
        assert_eq!(backend.requests().len(), 4);
        assert!(backend.requests()[3].ends_with("tree/main/ggml/extra"));
    }

    #[tokio::test]
    async fn error_aborts_resolution() {
        let backend = tree().with_response("tree/main/ggml", CannedResponse::Status(500));
        let result = resolver(backend.clone()).resolve_all(BASE).await;

        assert!(matches!(
            result,
            Err(HfError::ApiRequestFailed { status: 500, .. })
        ));
        // qnn is never requested once ggml failed
        assert!(!backend.requests().iter().any(|u| u.ends_with("/qnn")));
    }

    #[tokio::test]
    async fn malformed_index_is_an_error() {
        let backend = FakeBackend::new().with_json("tree/main", json!({"not": "a list"}));
        let result = resolver(backend).resolve_all(BASE).await;
        assert!(matches!(result, Err(HfError::JsonParse(_))));
    }

    #[tokio::test]
    async fn empty_body_is_an_error() {
        let backend = FakeBackend::new().with_response("tree/main", CannedResponse::Empty);
        let result = resolver(backend).resolve_all(BASE).await;
        assert!(matches!(result, Err(HfError::EmptyBody { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn paces_index_requests() {
        let started = tokio::time::Instant::now();
        let files = IndexResolver::new(Arc::new(tree()), Duration::from_millis(50))
            .resolve_all(BASE)
            .await
            .unwrap();

        assert_eq!(files.len(), 5);
        // Four requests, three pauses.
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
