//! Shutdown latch for the transceiver process.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

static PROCESS_LATCH: OnceLock<ShutdownLatch> = OnceLock::new();

/// Append-only shutdown flag.
///
/// Written from signal context (or any thread), read by the control loop.
/// The flag only ever goes from `false` to `true`; there is no reset.
#[derive(Debug, Clone, Default)]
pub struct ShutdownLatch {
    flag: Arc<AtomicBool>,
}

impl ShutdownLatch {
    /// Create an independent latch, initially clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide latch shared by signal handlers and the service.
    pub fn process() -> Self {
        PROCESS_LATCH.get_or_init(ShutdownLatch::new).clone()
    }

    /// Set the latch.
    ///
    /// A single relaxed store: no allocation, no locking, no I/O. Safe to
    /// call from an asynchronous signal handler.
    pub fn signal_shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// The underlying flag, for registration with `signal_hook::flag`.
    pub(crate) fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}
