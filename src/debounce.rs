//! Batch debouncing for change notifications
//!
//! A burst of raw change events collapses into one batch per quiescence
//! window: every `notify` re-arms the window, and `poll` flushes only once
//! the window has elapsed with no further changes. The pending set and the
//! last-change instant live behind one mutex, so a notify racing a flush
//! observes a consistent snapshot - no event is lost and none is delivered
//! twice.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default debounce window in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[derive(Debug, Default)]
struct Pending {
    batch: BTreeSet<PathBuf>,
    last_change: Option<Instant>,
}

/// Coalesces change notifications into debounced batches
#[derive(Debug)]
pub struct BatchDebouncer {
    window: Duration,
    pending: Mutex<Pending>,
}

impl BatchDebouncer {
    /// Create a debouncer with the given quiescence window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(Pending::default()),
        }
    }

    /// The configured quiescence window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record a change and re-arm the window
    ///
    /// Repeated edits to the same path collapse to one entry.
    pub fn notify(&self, path: PathBuf) {
        let mut pending = self.pending.lock().expect("debouncer lock poisoned");
        pending.batch.insert(path);
        pending.last_change = Some(Instant::now());
    }

    /// Whether changes are pending flush
    pub fn has_pending(&self) -> bool {
        let pending = self.pending.lock().expect("debouncer lock poisoned");
        !pending.batch.is_empty()
    }

    /// Flush the batch if the window has elapsed since the last change
    ///
    /// Returns `None` while changes are still settling or when nothing is
    /// pending; an empty batch never flushes.
    pub fn poll(&self) -> Option<BTreeSet<PathBuf>> {
        let mut pending = self.pending.lock().expect("debouncer lock poisoned");
        let last = pending.last_change?;
        if pending.batch.is_empty() || last.elapsed() < self.window {
            return None;
        }
        pending.last_change = None;
        Some(std::mem::take(&mut pending.batch))
    }
}
