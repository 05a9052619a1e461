//! HTTP backend abstraction.
//!
//! Index fetches and file transfers go through [`HttpBackend`] so the
//! resolver, fetcher and fetch manager can be driven by a scripted fake in
//! tests. The production implementation uses reqwest.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::HostConfig;
use crate::error::{HfError, HfResult};

/// Body of a file transfer, chunk by chunk.
pub type ByteStream = BoxStream<'static, HfResult<Bytes>>;

/// An open file transfer.
pub struct Download {
    /// `Content-Length`, when the host sent one.
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// HTTP Backend Trait
// ============================================================================

#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Fetch JSON from a URL and deserialize it.
    ///
    /// Non-success status and empty bodies are errors.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> HfResult<T>;

    /// Open a streaming GET.
    async fn get_stream(&self, url: &Url) -> HfResult<Download>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest.
///
/// Retries 5xx responses and connection errors with exponential backoff
/// when `max_retries` is non-zero.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay: Duration,
}

impl ReqwestBackend {
    pub fn new(config: &HostConfig) -> HfResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    /// Fetch a URL with automatic retry for transient errors.
    async fn fetch_with_retry(&self, url: &Url) -> HfResult<reqwest::Response> {
        let mut last_error: Option<HfError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.retry_base_delay * 2u32.pow(u32::from(attempt) - 1);
                debug!(%url, attempt, ?delay, "Retrying request");
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url.as_str()).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    // 5xx errors are retryable (server-side issues)
                    if status.is_server_error() && attempt < self.max_retries {
                        last_error = Some(HfError::ApiRequestFailed {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                        continue;
                    }

                    return Err(HfError::ApiRequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| HfError::InvalidResponse {
            message: "Unknown error during fetch".to_string(),
        }))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> HfResult<T> {
        let response = self.fetch_with_retry(url).await?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Err(HfError::EmptyBody {
                url: url.to_string(),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_stream(&self, url: &Url) -> HfResult<Download> {
        let response = self.fetch_with_retry(url).await?;
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(HfError::from))
            .boxed();
        Ok(Download {
            content_length,
            body,
        })
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, PoisonError};

    /// How a scripted body ends after its chunks.
    #[derive(Clone, Debug)]
    pub enum BodyEnd {
        Complete,
        /// The stream yields a transfer error.
        Fail(String),
        /// The stream never ends.
        Hang,
    }

    /// Canned response for the fake backend.
    #[derive(Clone, Debug)]
    pub enum CannedResponse {
        Json(serde_json::Value),
        /// Success status with an empty body.
        Empty,
        Status(u16),
        Body {
            chunks: Vec<Bytes>,
            content_length: Option<u64>,
            /// Wait before each chunk (and before the end).
            chunk_delay: Duration,
            end: BodyEnd,
        },
    }

    impl CannedResponse {
        /// A body delivered in one chunk with a correct `Content-Length`.
        pub fn bytes(data: impl Into<Bytes>) -> Self {
            let data = data.into();
            Self::Body {
                content_length: Some(data.len() as u64),
                chunks: vec![data],
                chunk_delay: Duration::ZERO,
                end: BodyEnd::Complete,
            }
        }
    }

    /// A fake HTTP backend returning canned responses.
    ///
    /// A URL is answered by the longest registered pattern it contains, so
    /// `tree/main/qnn` wins over `tree/main` for a subdirectory index.
    #[derive(Clone, Default)]
    pub struct FakeBackend {
        responses: Arc<Mutex<HashMap<String, CannedResponse>>>,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a canned response for a URL pattern.
        #[must_use]
        pub fn with_response(self, url_contains: &str, response: CannedResponse) -> Self {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(url_contains.to_string(), response);
            self
        }

        #[must_use]
        pub fn with_json(self, url_contains: &str, json: serde_json::Value) -> Self {
            self.with_response(url_contains, CannedResponse::Json(json))
        }

        /// Every URL requested so far, in order.
        pub fn requests(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn find_response(&self, url: &Url) -> HfResult<CannedResponse> {
            let url = url.to_string();
            self.requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(url.clone());

            let responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
            let found = responses
                .iter()
                .filter(|(pattern, _)| url.contains(pattern.as_str()))
                .max_by_key(|(pattern, _)| pattern.len())
                .map(|(_, response)| response.clone());

            match found {
                Some(CannedResponse::Status(status)) => {
                    Err(HfError::ApiRequestFailed { status, url })
                }
                Some(other) => Ok(other),
                None => Err(HfError::ApiRequestFailed { status: 404, url }),
            }
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> HfResult<T> {
            match self.find_response(url)? {
                CannedResponse::Json(json) => Ok(serde_json::from_value(json)?),
                CannedResponse::Empty => Err(HfError::EmptyBody {
                    url: url.to_string(),
                }),
                CannedResponse::Body { chunks, .. } => {
                    let body: Vec<u8> = chunks.iter().flat_map(|c| c.iter().copied()).collect();
                    Ok(serde_json::from_slice(&body)?)
                }
                CannedResponse::Status(status) => Err(HfError::ApiRequestFailed {
                    status,
                    url: url.to_string(),
                }),
            }
        }

        async fn get_stream(&self, url: &Url) -> HfResult<Download> {
            let (chunks, content_length, chunk_delay, end) = match self.find_response(url)? {
                CannedResponse::Body {
                    chunks,
                    content_length,
                    chunk_delay,
                    end,
                } => (chunks, content_length, chunk_delay, end),
                CannedResponse::Json(json) => {
                    let data = Bytes::from(serde_json::to_vec(&json)?);
                    (
                        vec![data.clone()],
                        Some(data.len() as u64),
                        Duration::ZERO,
                        BodyEnd::Complete,
                    )
                }
                CannedResponse::Empty => (Vec::new(), Some(0), Duration::ZERO, BodyEnd::Complete),
                CannedResponse::Status(status) => {
                    return Err(HfError::ApiRequestFailed {
                        status,
                        url: url.to_string(),
                    });
                }
            };

            let body = async_stream::stream! {
                for chunk in chunks {
                    if !chunk_delay.is_zero() {
                        tokio::time::sleep(chunk_delay).await;
                    }
                    yield Ok(chunk);
                }
                if !chunk_delay.is_zero() {
                    tokio::time::sleep(chunk_delay).await;
                }
                match end {
                    BodyEnd::Complete => {}
                    BodyEnd::Fail(message) => yield Err(HfError::Transfer { message }),
                    BodyEnd::Hang => std::future::pending::<()>().await,
                }
            };

            Ok(Download {
                content_length,
                body: body.boxed(),
            })
        }
    }
}
