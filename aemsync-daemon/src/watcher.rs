//! Filesystem watcher feeding the change queue.

use std::path::PathBuf;
use std::sync::Arc;

use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{broadcast, mpsc};

use crate::error::SyncError;
use crate::state::SyncState;

/// Watch `root` recursively and push every changed path onto the queue.
///
/// Classification happens at batch time, so raw paths are queued as-is.
pub(crate) async fn watcher_task(
    root: PathBuf,
    state: Arc<SyncState>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), SyncError> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher: RecommendedWatcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    tracing::debug!(path = %root.display(), "watching content tree");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };
                enqueue_event(&state, event);
            }
        }
    }

    Ok(())
}

fn enqueue_event(state: &SyncState, event: Event) {
    if !is_relevant_event_kind(&event.kind) {
        return;
    }
    for path in event.paths {
        tracing::trace!(path = %path.display(), kind = ?event.kind, "change queued");
        state.queue().push(path);
    }
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Any | EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::Duration;

    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind, RenameMode};

    use super::*;

    #[test]
    fn access_events_are_ignored() {
        assert!(!is_relevant_event_kind(&EventKind::Access(AccessKind::Any)));
        assert!(!is_relevant_event_kind(&EventKind::Other));
        assert!(is_relevant_event_kind(&EventKind::Create(CreateKind::File)));
        assert!(is_relevant_event_kind(&EventKind::Remove(RemoveKind::File)));
        assert!(is_relevant_event_kind(&EventKind::Modify(ModifyKind::Name(
            RenameMode::Both
        ))));
    }

    #[test]
    fn rename_queues_both_paths() {
        let state = SyncState::new();
        let event = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path(PathBuf::from("/w/jcr_root/apps/old.txt"))
            .add_path(PathBuf::from("/w/jcr_root/apps/new.txt"));

        enqueue_event(&state, event);
        assert_eq!(
            state.queue().drain_all(),
            vec![
                PathBuf::from("/w/jcr_root/apps/old.txt"),
                PathBuf::from("/w/jcr_root/apps/new.txt")
            ]
        );
    }

    #[tokio::test]
    async fn file_creation_reaches_the_queue() {
        let root = tempfile::Builder::new()
            .prefix("aemsync-watch")
            .tempdir()
            .expect("tempdir");
        let root_path = fs::canonicalize(root.path()).unwrap();
        let state = Arc::new(SyncState::new());
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let handle = tokio::spawn(watcher_task(
            root_path.clone(),
            state.clone(),
            shutdown_tx.subscribe(),
        ));
        // Let the watcher register before touching the tree.
        tokio::time::sleep(Duration::from_millis(200)).await;

        let file = root_path.join("created.txt");
        fs::write(&file, "x").unwrap();

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while state.queue().is_empty() && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let queued = state.queue().drain_unique();
        assert!(queued.contains(&file), "queued: {queued:?}");

        shutdown_tx.send(()).unwrap();
        handle.await.expect("join").expect("watcher");
    }
}
