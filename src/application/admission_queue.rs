//! Conference admission queue
//!
//! Serializes "create or reuse the conference for a line": at most one
//! queued operation runs at a time, in submission order.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// FIFO single-slot execution queue
#[derive(Debug, Default)]
pub struct ConferenceQueue {
    slot: Mutex<()>,
    pending: AtomicUsize,
}

/// Counts an operation from submission until it finishes or is dropped
struct Pending<'a>(&'a AtomicUsize);

impl<'a> Pending<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConferenceQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `operation` once every earlier submission has completed
    ///
    /// The tokio mutex hands out the slot in lock-request order.
    pub async fn enqueue<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _pending = Pending::new(&self.pending);
        let _slot = self.slot.lock().await;
        operation().await
    }

    /// True when nothing is queued or running
    pub fn is_empty(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0
    }
}
