//! Concurrent file fetcher.
//!
//! One task per file streams the response body straight to disk, writing
//! its byte counts only into its own slot of a shared, index-partitioned
//! table. A single aggregator loop (the stream returned by
//! [`FileFetcher::fetch`]) sums the table on a fixed interval and yields
//! percentage and throughput samples.
//!
//! # Failure policy
//!
//! On the first failed transfer every remaining task is aborted. Tasks that
//! were still transferring keep their partial file. Tasks that had finished,
//! successfully or not, have their file deleted. The stream then yields the
//! error and ends.
//!
//! Index paths must stay inside the destination. A list containing an
//! absolute path or a `..` component is refused before anything is requested.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_stream::stream;
use futures_util::{Stream, StreamExt};
use lmbridge_core::{DownloadError, FetchProgress};
use lmbridge_hf::{HttpBackend, build_file_url};
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::FetchConfig;

/// Byte counters of one file, written only by that file's task.
#[derive(Debug, Default)]
struct FileSlot {
    size: AtomicU64,
    transferred: AtomicU64,
}

type SlotTable = Arc<[FileSlot]>;

type TaskOutcome = (usize, Result<(), DownloadError>);

/// Transfers a flat list of repository files into a destination directory.
pub struct FileFetcher<B> {
    backend: Arc<B>,
    config: FetchConfig,
}

impl<B> Clone for FileFetcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config.clone(),
        }
    }
}

impl<B: HttpBackend + 'static> FileFetcher<B> {
    pub const fn new(backend: Arc<B>, config: FetchConfig) -> Self {
        Self { backend, config }
    }

    /// Fetch `files` from `{resolve_base}/{file}` into `{dest}/{file}`.
    ///
    /// Each call starts a fresh session. Dropping the stream aborts every
    /// transfer; so does cancelling `cancel`, which additionally yields
    /// [`DownloadError::Cancelled`].
    pub fn fetch(
        &self,
        files: Vec<String>,
        resolve_base: String,
        dest: PathBuf,
        cancel: CancellationToken,
    ) -> impl Stream<Item = Result<FetchProgress, DownloadError>> + Send + use<B> {
        let backend = Arc::clone(&self.backend);
        let period = self.config.progress_interval;
        let permits = Arc::new(Semaphore::new(self.config.concurrency()));
        let files: Vec<String> = files
            .into_iter()
            .filter(|f| {
                let keep = !self.config.is_excluded(f);
                if !keep {
                    debug!(file = %f, "Skipping excluded file");
                }
                keep
            })
            .collect();

        stream! {
            let targets = match files
                .iter()
                .map(|f| confined_path(&dest, f))
                .collect::<Result<Vec<_>, _>>()
            {
                Ok(targets) => targets,
                Err(e) => {
                    error!(dest = %dest.display(), error = %e, "Rejected index entry");
                    yield Err(e);
                    return;
                }
            };

            let slots: SlotTable = files.iter().map(|_| FileSlot::default()).collect();
            let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();

            for (index, (file, target)) in files.iter().zip(targets).enumerate() {
                let prepared = match build_file_url(&resolve_base, file) {
                    Ok(url) => match target.parent() {
                        Some(parent) => tokio::fs::create_dir_all(parent)
                            .await
                            .map(|()| url)
                            .map_err(DownloadError::from),
                        None => Ok(url),
                    },
                    Err(e) => Err(DownloadError::from(e)),
                };
                let url = match prepared {
                    Ok(url) => url,
                    Err(e) => {
                        error!(file = %file, error = %e, "Failed to prepare transfer");
                        cleanup_after_failure(&mut tasks, &dest, &files, Vec::new()).await;
                        yield Err(e);
                        return;
                    }
                };

                info!(file = %file, %url, "Starting transfer");
                tasks.spawn(transfer_file(
                    Arc::clone(&backend),
                    url,
                    target,
                    Arc::clone(&slots),
                    index,
                    Arc::clone(&permits),
                ));
            }

            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut previous_total = 0u64;
            let mut last_sample = Instant::now();
            let mut completed: Vec<usize> = Vec::new();

            loop {
                tokio::select! {
                    biased;

                    () = cancel.cancelled() => {
                        debug!(dest = %dest.display(), "Fetch cancelled");
                        tasks.abort_all();
                        while tasks.join_next().await.is_some() {}
                        yield Err(DownloadError::Cancelled);
                        return;
                    }

                    joined = tasks.join_next() => match joined {
                        None => break,
                        Some(Ok((index, Ok(())))) => completed.push(index),
                        Some(Ok((index, Err(e)))) => {
                            error!(file = %files[index], error = %e, "Transfer failed");
                            completed.push(index);
                            cleanup_after_failure(&mut tasks, &dest, &files, completed).await;
                            yield Err(e);
                            return;
                        }
                        Some(Err(join_error)) => {
                            let e = DownloadError::other(format!("transfer task failed: {join_error}"));
                            error!(error = %e, "Transfer task did not complete");
                            cleanup_after_failure(&mut tasks, &dest, &files, completed).await;
                            yield Err(e);
                            return;
                        }
                    },

                    _ = ticker.tick() => {
                        let now = Instant::now();
                        let sample = aggregate(&slots, previous_total, now.duration_since(last_sample));
                        previous_total = sample.transferred;
                        last_sample = now;
                        yield Ok(sample);
                    }
                }
            }

            let mut last = aggregate(&slots, previous_total, Instant::now().duration_since(last_sample));
            last.percentage = 100;
            info!(dest = %dest.display(), files = files.len(), bytes = last.transferred, "Fetch complete");
            yield Ok(last);
        }
    }
}

/// `dest` joined with a relative index path that cannot leave it.
fn confined_path(dest: &Path, file: &str) -> Result<PathBuf, DownloadError> {
    let relative = Path::new(file);
    let escapes = relative.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(DownloadError::other(format!(
            "index entry {file:?} points outside the model directory"
        )));
    }
    Ok(dest.join(relative))
}

fn aggregate(slots: &[FileSlot], previous_total: u64, elapsed: std::time::Duration) -> FetchProgress {
    let expected = slots.iter().map(|s| s.size.load(Ordering::Relaxed)).sum();
    let transferred: u64 = slots
        .iter()
        .map(|s| s.transferred.load(Ordering::Relaxed))
        .sum();
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    FetchProgress::compute(
        transferred,
        expected,
        transferred.saturating_sub(previous_total),
        elapsed_ms,
    )
}

async fn transfer_file<B: HttpBackend>(
    backend: Arc<B>,
    url: Url,
    target: PathBuf,
    slots: SlotTable,
    index: usize,
    permits: Arc<Semaphore>,
) -> TaskOutcome {
    let result = async {
        let _permit = permits
            .acquire_owned()
            .await
            .map_err(|_| DownloadError::Cancelled)?;

        let download = backend.get_stream(&url).await?;
        slots[index]
            .size
            .store(download.content_length.unwrap_or(0), Ordering::Relaxed);

        let mut file = tokio::fs::File::create(&target).await?;
        let mut body = download.body;
        let mut written = 0u64;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            slots[index].transferred.store(written, Ordering::Relaxed);
        }
        file.flush().await?;

        info!(file = %target.display(), bytes = written, "Finished transfer");
        Ok::<(), DownloadError>(())
    }
    .await;

    (index, result)
}

/// Abort every remaining task, then delete the files of tasks that finished.
///
/// `finished` holds the tasks already joined, including the one whose error
/// triggered the cleanup.
async fn cleanup_after_failure(
    tasks: &mut JoinSet<TaskOutcome>,
    dest: &Path,
    files: &[String],
    mut finished: Vec<usize>,
) {
    tasks.abort_all();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            // Finished before the abort took effect.
            Ok((index, _)) => finished.push(index),
            Err(e) if e.is_cancelled() => {}
            Err(e) => warn!(error = %e, "Transfer task panicked during cleanup"),
        }
    }

    for index in finished {
        let path = dest.join(&files[index]);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(file = %path.display(), "Removed finished file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(file = %path.display(), error = %e, "Failed to remove file"),
        }
    }
}
