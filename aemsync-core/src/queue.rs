//! Change queue — unbounded buffer between the watcher and the batch processor.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Raw changed paths awaiting the next batch.
///
/// Producers [`push`](Self::push); the batch processor is the only consumer
/// and takes everything at once with [`drain_unique`](Self::drain_unique).
#[derive(Debug, Default)]
pub struct ChangeQueue {
    pending: Mutex<Vec<PathBuf>>,
}

impl ChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one path. Never blocks on capacity and never rejects.
    pub fn push(&self, path: impl Into<PathBuf>) {
        self.lock().push(path.into());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return every queued path, leaving the queue empty.
    ///
    /// Paths pushed after the swap land in the next drain.
    pub fn drain_all(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.lock())
    }

    /// [`drain_all`](Self::drain_all) with exact duplicates removed,
    /// keeping first-seen order.
    pub fn drain_unique(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut drained = self.drain_all();
        drained.retain(|path| seen.insert(path.clone()));
        drained
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        // Poison is ignored: a push never leaves the buffer half-written.
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn drain_all_empties_the_queue() {
        let queue = ChangeQueue::new();
        queue.push("/a");
        queue.push("/b");
        assert_eq!(queue.len(), 2);

        let drained = queue.drain_all();
        assert_eq!(drained, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert!(queue.is_empty());
        assert!(queue.drain_all().is_empty());
    }

    #[test]
    fn drain_unique_yields_each_path_once() {
        let queue = ChangeQueue::new();
        for path in ["/x", "/y", "/x", "/z", "/y", "/x"] {
            queue.push(path);
        }

        let drained = queue.drain_unique();
        assert_eq!(
            drained,
            vec![
                PathBuf::from("/x"),
                PathBuf::from("/y"),
                PathBuf::from("/z")
            ]
        );
    }

    #[test]
    fn pushes_after_drain_belong_to_next_batch() {
        let queue = ChangeQueue::new();
        queue.push("/first");
        let first = queue.drain_unique();
        queue.push("/first");
        queue.push("/second");
        let second = queue.drain_unique();

        assert_eq!(first, vec![PathBuf::from("/first")]);
        assert_eq!(
            second,
            vec![PathBuf::from("/first"), PathBuf::from("/second")]
        );
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        let queue = Arc::new(ChangeQueue::new());
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let queue = queue.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        queue.push(format!("/w{worker}/{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("producer thread");
        }

        let drained = queue.drain_unique();
        assert_eq!(drained.len(), 1000);
        assert!(drained.iter().any(|p| p == Path::new("/w3/249")));
    }
}
