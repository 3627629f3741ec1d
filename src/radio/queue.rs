//! Receive sample queue between the radio interface and the transceiver.
//!
//! # Design Decisions
//! - Bounded crossbeam channel; the interface never blocks on a slow consumer
//! - A full queue drops the newest burst and counts an overrun
//! - The queue owns both channel ends, so it never disconnects while alive

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::observability::metrics;
use crate::radio::types::RadioBurst;

#[derive(Debug)]
pub struct SampleQueue {
    tx: Sender<RadioBurst>,
    rx: Receiver<RadioBurst>,
    overruns: AtomicU64,
}

impl SampleQueue {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self {
            tx,
            rx,
            overruns: AtomicU64::new(0),
        }
    }

    /// Enqueue a burst; returns `false` if it was dropped.
    pub(crate) fn push(&self, burst: RadioBurst) -> bool {
        match self.tx.try_send(burst) {
            Ok(()) => true,
            Err(TrySendError::Full(burst)) => {
                let n = self.overruns.fetch_add(1, Ordering::Relaxed) + 1;
                metrics::record_queue_overrun();
                tracing::debug!(timestamp = burst.timestamp, overruns = n, "Receive queue overrun");
                false
            }
            // Unreachable while `self.rx` exists.
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Wait up to `timeout` for the next burst.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<RadioBurst> {
        match self.rx.recv_timeout(timeout) {
            Ok(burst) => Some(burst),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Take the next burst if one is queued.
    pub fn try_recv(&self) -> Option<RadioBurst> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }

    /// Bursts dropped because the queue was full.
    pub fn overruns(&self) -> u64 {
        self.overruns.load(Ordering::Relaxed)
    }
}
