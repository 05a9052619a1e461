//! Model fetch manager.
//!
//! Runs index resolution and the file fetcher against each configured host
//! in order. Every host attempt starts from scratch: a file list discovered
//! on one host is never reused on the next.

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::StreamExt;
use lmbridge_core::domain::{join_components, repository_id, split_components};
use lmbridge_core::{DownloadError, ResolvedModel, StorageGrant};
use lmbridge_hf::{HfResult, HostConfig, HostUrls, HttpBackend, IndexResolver, ReqwestBackend};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::FetchConfig;
use crate::fetcher::FileFetcher;
use crate::lease::AcquisitionLocks;
use crate::observer::FetchObserver;
use crate::validate::{ValidationError, check_manifest};

pub struct FetchManager<B> {
    hosts: HostConfig,
    config: FetchConfig,
    resolver: IndexResolver<B>,
    fetcher: FileFetcher<B>,
    locks: AcquisitionLocks,
}

impl FetchManager<ReqwestBackend> {
    /// Manager talking to real hosts over reqwest.
    pub fn with_reqwest(hosts: HostConfig, config: FetchConfig) -> HfResult<Self> {
        let backend = Arc::new(ReqwestBackend::new(&hosts)?);
        Ok(Self::new(backend, hosts, config))
    }
}

impl<B: HttpBackend + 'static> FetchManager<B> {
    pub fn new(backend: Arc<B>, hosts: HostConfig, config: FetchConfig) -> Self {
        Self {
            resolver: IndexResolver::new(Arc::clone(&backend), hosts.index_delay()),
            fetcher: FileFetcher::new(backend, config.clone()),
            hosts,
            config,
            locks: AcquisitionLocks::new(),
        }
    }

    /// Share acquisition locks with other managers or services.
    #[must_use]
    pub fn with_locks(mut self, locks: AcquisitionLocks) -> Self {
        self.locks = locks;
        self
    }

    pub const fn locks(&self) -> &AcquisitionLocks {
        &self.locks
    }

    pub const fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Download one (encoded, single-component) model into the model root.
    ///
    /// Fails with [`DownloadError::AllHostsFailed`] only after every host
    /// has been tried, or immediately on cancellation or a concurrent
    /// acquisition of the same model.
    pub async fn acquire(
        &self,
        grant: &StorageGrant,
        model_id: &str,
        cancel: &CancellationToken,
        observer: &dyn FetchObserver,
    ) -> Result<PathBuf, DownloadError> {
        let _lease = self.locks.try_lease(model_id)?;
        let dest = grant.model_dir(model_id);
        let repo = repository_id(&self.config.repo_owner, model_id);

        let mut last_error: Option<DownloadError> = None;
        for host in self.hosts.hosts() {
            info!(model_id, host = %host, "Trying to fetch model");
            observer.on_host_attempt(model_id, host);

            match self.attempt_host(host, &repo, model_id, &dest, cancel, observer).await {
                Ok(()) => {
                    info!(model_id, host = %host, path = %dest.display(), "Model fetched");
                    return Ok(dest);
                }
                Err(DownloadError::Cancelled) => return Err(DownloadError::Cancelled),
                Err(e) => {
                    warn!(model_id, host = %host, error = %e, "Fetch from host failed");
                    observer.on_host_failed(model_id, host, &e);
                    last_error = Some(e);
                }
            }
        }

        Err(DownloadError::AllHostsFailed {
            model_id: model_id.to_string(),
            attempts: self.hosts.hosts().len(),
            last_error: last_error.map_or_else(|| "no hosts configured".to_string(), |e| e.to_string()),
        })
    }

    async fn attempt_host(
        &self,
        host: &str,
        repo: &str,
        model_id: &str,
        dest: &std::path::Path,
        cancel: &CancellationToken,
        observer: &dyn FetchObserver,
    ) -> Result<(), DownloadError> {
        tokio::fs::create_dir_all(dest).await?;
        let urls = HostUrls::new(host, repo)?;

        let files = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(DownloadError::Cancelled),
            files = self.resolver.resolve_all(urls.index.clone()) => files?,
        };
        debug!(model_id, host, files = files.len(), "Index resolved");

        let progress = self
            .fetcher
            .fetch(files, urls.resolve, dest.to_path_buf(), cancel.clone());
        futures_util::pin_mut!(progress);
        while let Some(sample) = progress.next().await {
            observer.on_progress(model_id, sample?);
        }
        Ok(())
    }

    /// Local directory of `model_id`, if it exists. Contents are not checked.
    pub fn find_local(&self, grant: &StorageGrant, model_id: &str) -> Option<PathBuf> {
        let path = grant.model_dir(model_id);
        path.is_dir().then_some(path)
    }

    /// Whether every manifest file exists for `model_id`.
    pub fn validate_local(&self, grant: &StorageGrant, model_id: &str) -> bool {
        self.validate_local_report(grant, model_id).is_ok()
    }

    /// Like [`Self::validate_local`], naming the first missing file.
    pub fn validate_local_report(
        &self,
        grant: &StorageGrant,
        model_id: &str,
    ) -> Result<ResolvedModel, ValidationError> {
        let path = grant.model_dir(model_id);
        check_manifest(&path, &self.config.manifest)?;
        Ok(ResolvedModel {
            model_id: model_id.to_string(),
            path,
            valid: true,
        })
    }

    /// Make every component of an encoded (possibly composite) id available locally.
    ///
    /// Components are found locally, validated, and downloaded when absent or
    /// invalid. A downloaded component must pass the manifest check too.
    /// Returns the local paths joined with `+`.
    pub async fn fetch_model(
        &self,
        grant: &StorageGrant,
        model_id: &str,
        cancel: &CancellationToken,
        observer: &dyn FetchObserver,
    ) -> Result<String, DownloadError> {
        let mut paths = Vec::new();
        for component in split_components(model_id) {
            let path = match self.find_local(grant, component) {
                None => {
                    info!(model_id = component, "Model not found locally, downloading");
                    self.acquire_validated(grant, component, cancel, observer).await?
                }
                Some(_) if !self.validate_local(grant, component) => {
                    warn!(model_id = component, "Local model incomplete, downloading again");
                    self.acquire_validated(grant, component, cancel, observer).await?
                }
                Some(path) => {
                    info!(model_id = component, path = %path.display(), "Found model locally");
                    path
                }
            };
            paths.push(path.display().to_string());
        }
        Ok(join_components(paths))
    }

    async fn acquire_validated(
        &self,
        grant: &StorageGrant,
        model_id: &str,
        cancel: &CancellationToken,
        observer: &dyn FetchObserver,
    ) -> Result<PathBuf, DownloadError> {
        self.acquire(grant, model_id, cancel, observer).await?;
        self.validate_local_report(grant, model_id)
            .map(|resolved| resolved.path)
            .map_err(|e| {
                warn!(model_id, error = %e, "Downloaded model failed validation");
                DownloadError::not_found(e.to_string())
            })
    }
}
