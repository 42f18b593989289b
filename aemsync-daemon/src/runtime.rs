use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use aemsync_core::SyncConfig;
use aemsync_package::PackageBuilder;

use crate::batch::{BatchProcessor, TickOutcome};
use crate::error::{io_err, SyncError};
use crate::state::SyncState;
use crate::upload::{HttpTransport, Uploader};
use crate::watcher::watcher_task;

/// Start the sync runtime and block the current thread until it exits.
pub fn start_blocking(config: SyncConfig) -> Result<(), SyncError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Run the watcher and batch processor until ctrl-c or a task failure.
pub async fn run(config: SyncConfig) -> Result<(), SyncError> {
    tracing::info!(
        "Watching: {}. Update interval: {} ms.",
        config.watch_root.display(),
        config.interval.as_millis()
    );
    if config.watch_root_is_hidden() {
        tracing::warn!(
            path = %config.watch_root.display(),
            "watch root is inside a hidden directory; no changes will be synced"
        );
    }
    for target in &config.targets {
        tracing::info!(target_host = %target, "sync target");
    }

    let state = Arc::new(SyncState::new());
    let transport = Arc::new(HttpTransport::new(config.upload_timeout)?);
    let processor = Arc::new(BatchProcessor::new(
        state.clone(),
        PackageBuilder::new()?,
        Uploader::new(transport, config.targets.clone()),
    ));

    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let watcher_handle = {
        let shutdown = shutdown_tx.clone();
        let root = config.watch_root.clone();
        let state = state.clone();
        tokio::spawn(async move {
            let result = watcher_task(root, state, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let processor_handle = {
        let shutdown = shutdown_tx.clone();
        let interval = config.interval;
        tokio::spawn(async move {
            let result = processor_task(processor, interval, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(SyncError::Task(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (watcher_result, processor_result, signal_result) =
        tokio::join!(watcher_handle, processor_handle, signal_handle);

    handle_join("watcher", watcher_result)?;
    handle_join("batch_processor", processor_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

async fn processor_task(
    processor: Arc<BatchProcessor>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), SyncError> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = ticker.tick() => {
                match processor.tick().await {
                    Ok(TickOutcome::Uploaded(report)) => {
                        let failed = report
                            .uploads
                            .iter()
                            .filter(|upload| !upload.outcome.is_success())
                            .count();
                        tracing::info!(
                            updated = report.updated,
                            deleted = report.deleted,
                            targets = report.uploads.len(),
                            failed,
                            "batch uploaded",
                        );
                    }
                    Ok(TickOutcome::Empty { paths }) => {
                        tracing::debug!(paths, "batch had nothing to install");
                    }
                    Ok(TickOutcome::Busy | TickOutcome::Idle) => {}
                    Err(err) => {
                        tracing::error!(error = %err, "batch abandoned");
                    }
                }
            }
        }
    }

    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), SyncError>, tokio::task::JoinError>,
) -> Result<(), SyncError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(SyncError::Task(format!("{task} task join failure: {err}"))),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
