//! Cancelable delayed events.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Holds at most one pending delayed event.
///
/// Scheduling again aborts the previous task, so only the most recent
/// schedule fires. Each schedule gets a fresh generation number; an event
/// whose generation is not the current one is stale and must be ignored
/// (an aborted task may already have posted before the abort landed).
#[derive(Debug)]
pub(crate) struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl Debouncer {
    pub(crate) fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
            generation: 0,
        }
    }

    /// Post `make(generation)` on `tx` after the delay, replacing any pending post.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn schedule<E, F>(&mut self, tx: &UnboundedSender<E>, make: F)
    where
        E: Send + 'static,
        F: FnOnce(u64) -> E,
    {
        self.cancel();
        self.generation += 1;
        let event = make(self.generation);
        let tx = tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        }));
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Accept a fired event. Returns `false` for stale generations.
    pub(crate) fn complete(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && generation == self.generation {
            self.pending = None;
            true
        } else {
            false
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
