//! Batch processor — turns queued paths into one uploaded package per tick.
//!
//! ## Tick protocol
//!
//! 1. Busy if a batch is in flight; idle if the queue is empty.
//! 2. Claim the in-flight gate for every target.
//! 3. Drain and deduplicate the queue.
//! 4. Classify each path; skip the ones outside `jcr_root`.
//! 5. Re-check the filesystem: missing → delete, file → update, directory → skip.
//! 6. Finalize the package and upload it, waiting for every target.
//!
//! A batch without filter entries is not uploaded; the gate is released
//! immediately instead. An abandoned batch puts its drained paths back on the
//! queue, minus the path that failed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;

use aemsync_core::{classify, FilterEntry};
use aemsync_package::PackageBuilder;

use crate::error::{io_err, SyncError};
use crate::state::SyncState;
use crate::upload::{UploadReport, Uploader};

/// What a single tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// A previous batch is still waiting on target responses.
    Busy,
    /// Nothing queued.
    Idle,
    /// Paths were drained but none produced a filter entry.
    Empty { paths: usize },
    /// A package was uploaded to every target.
    Uploaded(BatchReport),
}

#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Files added to the package.
    pub updated: usize,
    /// Items selected for removal.
    pub deleted: usize,
    pub uploads: Vec<UploadReport>,
}

pub struct BatchProcessor {
    state: Arc<SyncState>,
    builder: Arc<PackageBuilder>,
    uploader: Uploader,
}

impl BatchProcessor {
    pub fn new(state: Arc<SyncState>, builder: PackageBuilder, uploader: Uploader) -> Self {
        Self {
            state,
            builder: Arc::new(builder),
            uploader,
        }
    }

    pub fn state(&self) -> &Arc<SyncState> {
        &self.state
    }

    /// Run one timer tick.
    ///
    /// # Errors
    /// Package assembly failures abandon the batch before any upload; the
    /// other drained paths are requeued for the next tick. The in-flight gate
    /// is released in every case.
    pub async fn tick(&self) -> Result<TickOutcome, SyncError> {
        if self.state.in_flight() > 0 {
            return Ok(TickOutcome::Busy);
        }
        if self.state.queue().is_empty() {
            return Ok(TickOutcome::Idle);
        }
        let Some(gate) = self.state.try_acquire(self.uploader.target_count()) else {
            return Ok(TickOutcome::Busy);
        };

        let paths = self.state.queue().drain_unique();
        let path_count = paths.len();
        let builder = self.builder.clone();
        let (paths, assembled) = tokio::task::spawn_blocking(move || {
            let assembled = assemble(&builder, &paths);
            (paths, assembled)
        })
        .await
        .map_err(|err| SyncError::Task(format!("package assembly join error: {err}")))?;
        let assembled = match assembled {
            Ok(assembled) => assembled,
            Err(err) => {
                self.requeue(paths, &err);
                return Err(err);
            }
        };

        let Some(batch) = assembled else {
            tracing::debug!(paths = path_count, "no filter entries in batch; upload skipped");
            return Ok(TickOutcome::Empty { paths: path_count });
        };

        let uploads = self
            .uploader
            .submit(Bytes::from(batch.archive), &gate)
            .await;
        Ok(TickOutcome::Uploaded(BatchReport {
            updated: batch.updated,
            deleted: batch.deleted,
            uploads,
        }))
    }

    /// Return an abandoned batch's paths to the queue, dropping the one that failed.
    fn requeue(&self, paths: Vec<PathBuf>, err: &SyncError) {
        let failed = err.path();
        let mut requeued = 0usize;
        for path in paths {
            if failed == Some(path.as_path()) {
                continue;
            }
            self.state.queue().push(path);
            requeued += 1;
        }
        tracing::warn!(
            requeued,
            failed = ?failed.map(Path::display),
            "batch abandoned; drained changes requeued"
        );
    }
}

/// A finalized package ready for upload.
#[derive(Debug)]
pub(crate) struct AssembledBatch {
    pub(crate) archive: Vec<u8>,
    pub(crate) updated: usize,
    pub(crate) deleted: usize,
}

/// Current state of a changed path, read at batch time.
enum Current {
    Missing,
    File(Vec<u8>),
    Other,
}

/// Build one package from deduplicated paths.
///
/// Returns `None` when no path produced a filter entry.
pub(crate) fn assemble(
    builder: &PackageBuilder,
    paths: &[PathBuf],
) -> Result<Option<AssembledBatch>, SyncError> {
    let mut package = builder.create()?;
    let mut updated = 0usize;
    let mut deleted = 0usize;

    for path in paths {
        let Some(classified) = classify(path) else {
            tracing::trace!(path = %path.display(), "outside repository tree; skipped");
            continue;
        };

        match read_current(path)? {
            Current::Missing => {
                if package.add_entry(FilterEntry::Delete {
                    item: classified.item,
                }) {
                    tracing::info!("Delete: {}", classified.archive_path);
                    deleted += 1;
                }
            }
            Current::File(contents) => {
                package.add_file(&classified.archive_path, &contents)?;
                if package.add_entry(FilterEntry::Update {
                    item: classified.item,
                    scope: classified.scope,
                }) {
                    tracing::info!("Update: {}", classified.archive_path);
                    updated += 1;
                }
            }
            Current::Other => {}
        }
    }

    if package.is_empty() {
        return Ok(None);
    }
    let archive = builder.finalize(package)?;
    Ok(Some(AssembledBatch {
        archive,
        updated,
        deleted,
    }))
}

fn read_current(path: &Path) -> Result<Current, SyncError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if is_vanished(&err) => return Ok(Current::Missing),
        Err(err) => return Err(io_err(path, err)),
    };
    if !meta.is_file() {
        return Ok(Current::Other);
    }
    // The file may vanish between stat and read.
    match fs::read(path) {
        Ok(contents) => Ok(Current::File(contents)),
        Err(err) if is_vanished(&err) => Ok(Current::Missing),
        Err(err) => Err(io_err(path, err)),
    }
}

/// An ancestor replaced by a file reports `NotADirectory` rather than `NotFound`.
fn is_vanished(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
