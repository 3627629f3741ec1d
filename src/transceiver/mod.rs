//! Transceiver worker.
//!
//! # Data Flow
//! ```text
//! SampleQueue (owned by the radio interface)
//!     → worker thread (borrows the queue)
//!     → GsmTime tagging (one timeslot per burst)
//!     → BurstSink (demodulation / controller side)
//! ```
//!
//! # Design Decisions
//! - The transceiver never owns the queue; it holds `&'scope SampleQueue`
//! - Worker runs on a scoped thread, so it cannot outlive the queue's owner
//! - Stop drains queued bursts before the worker exits
//! - Dropping the transceiver stops it

pub mod sink;
pub mod time;

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::observability::metrics;
use crate::radio::queue::SampleQueue;
use crate::radio::types::RadioBurst;

pub use sink::{BurstSink, PowerMeter};
pub use time::GsmTime;

/// How long the worker waits on an empty queue before rechecking stop.
const RECV_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum TransceiverError {
    #[error("transceiver started before a receive queue was bound")]
    NotBound,

    #[error("transceiver already started")]
    AlreadyStarted,

    #[error("failed to spawn transceiver worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Transceiver construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransceiverParams {
    /// Base UDP port of the controller interface.
    pub base_port: u16,
    /// Controller address.
    pub controller_ip: IpAddr,
    pub samples_per_symbol: usize,
    /// Clock value assigned to the first received burst.
    pub start_time: GsmTime,
}

impl Default for TransceiverParams {
    fn default() -> Self {
        Self {
            base_port: 5700,
            controller_ip: IpAddr::V4(Ipv4Addr::LOCALHOST),
            samples_per_symbol: 1,
            start_time: GsmTime::new(3, 0),
        }
    }
}

#[derive(Debug, Default)]
struct WorkerCounters {
    bursts: AtomicU64,
    samples: AtomicU64,
}

/// Point-in-time worker statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransceiverStats {
    pub bursts_consumed: u64,
    pub samples_consumed: u64,
}

/// The transceiver: consumes the interface's receive queue on a worker thread.
pub struct Transceiver<'q> {
    params: TransceiverParams,
    queue: Option<&'q SampleQueue>,
    sink: Option<Box<dyn BurstSink>>,
    stop: Arc<AtomicBool>,
    counters: Arc<WorkerCounters>,
    worker: Option<ScopedJoinHandle<'q, ()>>,
}

impl<'q> Transceiver<'q> {
    pub fn new(params: TransceiverParams, sink: Box<dyn BurstSink>) -> Self {
        tracing::info!(
            base_port = params.base_port,
            controller_ip = %params.controller_ip,
            samples_per_symbol = params.samples_per_symbol,
            start_time = %params.start_time,
            "Transceiver constructed"
        );
        Self {
            params,
            queue: None,
            sink: Some(sink),
            stop: Arc::new(AtomicBool::new(false)),
            counters: Arc::new(WorkerCounters::default()),
            worker: None,
        }
    }

    pub fn params(&self) -> &TransceiverParams {
        &self.params
    }

    /// Attach the receive queue. The queue stays owned by its interface.
    pub fn bind(&mut self, queue: &'q SampleQueue) {
        self.queue = Some(queue);
    }

    pub fn is_bound(&self) -> bool {
        self.queue.is_some()
    }

    /// Start the worker on `scope`.
    pub fn start(&mut self, scope: &'q Scope<'q, '_>) -> Result<(), TransceiverError> {
        let queue = self.queue.ok_or(TransceiverError::NotBound)?;
        let sink = self.sink.take().ok_or(TransceiverError::AlreadyStarted)?;

        let stop = Arc::clone(&self.stop);
        let counters = Arc::clone(&self.counters);
        let start_time = self.params.start_time;

        let handle = thread::Builder::new()
            .name("trx-worker".into())
            .spawn_scoped(scope, move || run_worker(queue, sink, &stop, &counters, start_time))
            .map_err(TransceiverError::Spawn)?;

        self.worker = Some(handle);
        tracing::info!("Transceiver started");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn stats(&self) -> TransceiverStats {
        TransceiverStats {
            bursts_consumed: self.counters.bursts.load(Ordering::Relaxed),
            samples_consumed: self.counters.samples.load(Ordering::Relaxed),
        }
    }

    /// Stop the worker: drain queued bursts, then join. Idempotent.
    ///
    /// When this returns the worker no longer touches the queue.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!("Transceiver worker panicked");
            }
            let stats = self.stats();
            tracing::info!(
                bursts = stats.bursts_consumed,
                samples = stats.samples_consumed,
                "Transceiver stopped"
            );
        }
    }
}

impl Drop for Transceiver<'_> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(
    queue: &SampleQueue,
    mut sink: Box<dyn BurstSink>,
    stop: &AtomicBool,
    counters: &WorkerCounters,
    start_time: GsmTime,
) {
    let mut clock = start_time;
    let mut deliver = |burst: RadioBurst, sink: &mut Box<dyn BurstSink>| {
        counters.bursts.fetch_add(1, Ordering::Relaxed);
        counters.samples.fetch_add(burst.len() as u64, Ordering::Relaxed);
        metrics::record_burst_consumed();
        sink.consume(clock, burst);
        clock.advance();
    };

    sink.started();
    while !stop.load(Ordering::Relaxed) {
        if let Some(burst) = queue.recv_timeout(RECV_POLL) {
            deliver(burst, &mut sink);
        }
    }

    let mut drained = 0usize;
    while let Some(burst) = queue.try_recv() {
        deliver(burst, &mut sink);
        drained += 1;
    }
    tracing::debug!(drained, "Transceiver worker drained queue");
    sink.stopped();
}
