//! CLI composition root.
//!
//! Resolves the model root and wires the storage gate, host layer and fetch
//! manager that every handler shares.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use lmbridge_core::{NameCodec, PermissionGate, StorageGrant, WritableDirGate, resolve_model_root};
use lmbridge_download::{FetchConfig, FetchManager};
use lmbridge_hf::{HostConfig, ReqwestBackend};
use tracing::debug;

/// Options collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub model_root: Option<PathBuf>,
    pub hosts: Vec<String>,
    pub max_concurrent_files: Option<usize>,
}

pub struct CliContext {
    pub model_root: PathBuf,
    pub gate: Arc<dyn PermissionGate>,
    pub manager: Arc<FetchManager<ReqwestBackend>>,
    pub codec: NameCodec,
}

impl CliContext {
    pub fn grant(&self) -> Result<StorageGrant> {
        Ok(self.gate.request()?)
    }

    pub fn model_root(&self) -> &Path {
        &self.model_root
    }
}

pub fn bootstrap(config: CliConfig) -> Result<CliContext> {
    let resolution = resolve_model_root(config.model_root.as_deref())?;
    debug!(root = %resolution.path.display(), source = ?resolution.source, "Resolved model root");

    let mut hosts = HostConfig::new();
    if !config.hosts.is_empty() {
        hosts = hosts.with_hosts(config.hosts);
    }
    let mut fetch = FetchConfig::new();
    if let Some(max) = config.max_concurrent_files {
        fetch = fetch.with_max_concurrent_files(max);
    }
    let manager = FetchManager::with_reqwest(hosts, fetch)?;

    Ok(CliContext {
        gate: Arc::new(WritableDirGate::new(&resolution.path)),
        model_root: resolution.path,
        manager: Arc::new(manager),
        codec: NameCodec::for_build(),
    })
}
