//! Scheduler-owned state shared by the watcher, processor, and uploader.

use std::sync::atomic::{AtomicUsize, Ordering};

use aemsync_core::ChangeQueue;

/// Pending changes plus the single-flight upload gate.
#[derive(Debug, Default)]
pub struct SyncState {
    queue: ChangeQueue,
    in_flight: AtomicUsize,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self) -> &ChangeQueue {
        &self.queue
    }

    /// Target responses still outstanding for the current batch.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the gate for a batch uploading to `targets` endpoints.
    ///
    /// Succeeds only when nothing is in flight. The counter is set to
    /// `targets` (at least one) and falls back to zero as the guard reports
    /// completions or is dropped.
    pub fn try_acquire(&self, targets: usize) -> Option<InFlightGuard<'_>> {
        let count = targets.max(1);
        self.in_flight
            .compare_exchange(0, count, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                in_flight: &self.in_flight,
                remaining: AtomicUsize::new(count),
            })
    }
}

/// Outstanding completions for one batch.
///
/// Dropping the guard releases whatever has not been completed, so an
/// abandoned batch cannot hold the gate.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    in_flight: &'a AtomicUsize,
    remaining: AtomicUsize,
}

impl InFlightGuard<'_> {
    /// Record one target completion. Returns `false` once all are recorded.
    pub fn complete_one(&self) -> bool {
        let claimed = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok();
        if claimed {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
        }
        claimed
    }

    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let rest = self.remaining.swap(0, Ordering::AcqRel);
        if rest > 0 {
            self.in_flight.fetch_sub(rest, Ordering::AcqRel);
        }
    }
}
