//! Bounded handoff queue — a near-rendezvous synchronous handshake between
//! one producer and one consumer, with backpressure (spec §4.2).
//!
//! Tokio's `mpsc` channel requires a buffer of at least 1 (a true
//! zero-capacity channel panics on construction), so this uses the smallest
//! capacity the spec permits as a tuning knob: exactly 1. A `Put` still
//! blocks once that one slot is full until `Take` drains it, which is the
//! backpressure behavior the spec cares about — if Delivery stalls,
//! Enrichment blocks on `Put`; if Enrichment stalls, the Ingest HTTP handler
//! blocks on `Put` and holds the Source callback open.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Capacity of every handoff queue in the pipeline. See module docs for why
/// this isn't 0.
pub const RENDEZVOUS_CAPACITY: usize = 1;

/// Producer half of a [`HandoffQueue`].
pub struct QueueTx<T> {
    tx: mpsc::Sender<T>,
}

/// Consumer half of a [`HandoffQueue`].
pub struct QueueRx<T> {
    rx: mpsc::Receiver<T>,
}

/// Construct a new handoff queue, returning its producer and consumer
/// halves.
pub fn channel<T>() -> (QueueTx<T>, QueueRx<T>) {
    let (tx, rx) = mpsc::channel(RENDEZVOUS_CAPACITY);
    (QueueTx { tx }, QueueRx { rx })
}

impl<T> QueueTx<T> {
    /// Blocks until the consumer accepts the message or `cancel` fires.
    ///
    /// On cancellation the message is dropped with a logged warning, per
    /// spec: "the message is dropped with a logged warning."
    pub async fn put(&self, msg: T, cancel: &CancellationToken) -> PutOutcome {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("queue put cancelled, dropping message");
                PutOutcome::Cancelled
            }
            result = self.tx.send(msg) => {
                match result {
                    Ok(()) => PutOutcome::Delivered,
                    Err(_) => {
                        warn!("queue put failed: consumer gone, dropping message");
                        PutOutcome::Cancelled
                    }
                }
            }
        }
    }
}

impl<T> Clone for QueueTx<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> QueueRx<T> {
    /// Blocks until a producer `put`s or `cancel` fires.
    ///
    /// Returns `None` on cancellation or when every producer has dropped —
    /// both are "shutdown" from the consumer's point of view.
    pub async fn take(&mut self, cancel: &CancellationToken) -> Option<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            msg = self.rx.recv() => msg,
        }
    }
}

/// Result of a [`QueueTx::put`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Delivered,
    Cancelled,
}
