//! Transceiver lifecycle state machine.
//!
//! # States
//! - Uninitialized: process started, nothing negotiated
//! - Configured: device open, interface selected, transceiver bound
//! - Running: transceiver worker started
//! - ShuttingDown: shutdown observed, teardown in progress
//! - Stopped: all resources released
//!
//! # State Transitions
//! ```text
//! Uninitialized → Configured → Running → ShuttingDown → Stopped
//! ```
//!
//! # Design Decisions
//! - Strictly linear; any other transition is rejected
//! - State lives in an atomic so other threads can observe it
//! - Transitions are logged and exported as a gauge

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::lifecycle::error::LifecycleError;
use crate::observability::metrics;

/// Lifecycle state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Uninitialized = 0,
    Configured = 1,
    Running = 2,
    ShuttingDown = 3,
    Stopped = 4,
}

impl From<u8> for LifecycleState {
    fn from(val: u8) -> Self {
        match val {
            1 => LifecycleState::Configured,
            2 => LifecycleState::Running,
            3 => LifecycleState::ShuttingDown,
            4 => LifecycleState::Stopped,
            _ => LifecycleState::Uninitialized,
        }
    }
}

impl LifecycleState {
    /// The only state reachable from `self`.
    pub fn next(self) -> Option<LifecycleState> {
        match self {
            LifecycleState::Uninitialized => Some(LifecycleState::Configured),
            LifecycleState::Configured => Some(LifecycleState::Running),
            LifecycleState::Running => Some(LifecycleState::ShuttingDown),
            LifecycleState::ShuttingDown => Some(LifecycleState::Stopped),
            LifecycleState::Stopped => None,
        }
    }
}

/// Shared, observable lifecycle state.
#[derive(Debug, Clone)]
pub struct StateHandle {
    state: Arc<AtomicU8>,
}

impl Default for StateHandle {
    fn default() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(LifecycleState::Uninitialized as u8)),
        }
    }
}

impl StateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> LifecycleState {
        LifecycleState::from(self.state.load(Ordering::Acquire))
    }

    /// Advance to `to`, which must be the successor of the current state.
    pub(crate) fn transition(&self, to: LifecycleState) -> Result<(), LifecycleError> {
        let from = self.get();
        if from.next() != Some(to) {
            return Err(LifecycleError::InvalidTransition { from, to });
        }
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|actual| LifecycleError::InvalidTransition {
                from: LifecycleState::from(actual),
                to,
            })?;

        metrics::record_lifecycle_state(to);
        tracing::info!(from = ?from, to = ?to, "Lifecycle transition");
        Ok(())
    }

    /// Block until the state reaches at least `target`, or `timeout` passes.
    ///
    /// A timeout too large to represent as a deadline waits indefinitely.
    pub fn wait_for(&self, target: LifecycleState, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            if self.get() >= target {
                return true;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_transitions() {
        let state = StateHandle::new();
        assert_eq!(state.get(), LifecycleState::Uninitialized);
        for to in [
            LifecycleState::Configured,
            LifecycleState::Running,
            LifecycleState::ShuttingDown,
            LifecycleState::Stopped,
        ] {
            state.transition(to).unwrap();
            assert_eq!(state.get(), to);
        }
        assert_eq!(LifecycleState::Stopped.next(), None);
    }

    #[test]
    fn test_rejects_skips_and_reentry() {
        let state = StateHandle::new();
        assert!(matches!(
            state.transition(LifecycleState::Running),
            Err(LifecycleError::InvalidTransition {
                from: LifecycleState::Uninitialized,
                to: LifecycleState::Running
            })
        ));
        state.transition(LifecycleState::Configured).unwrap();
        assert!(state.transition(LifecycleState::Configured).is_err());
        assert!(state.transition(LifecycleState::Uninitialized).is_err());
        assert_eq!(state.get(), LifecycleState::Configured);
    }

    #[test]
    fn test_u8_round_trip() {
        assert_eq!(LifecycleState::from(LifecycleState::ShuttingDown as u8), LifecycleState::ShuttingDown);
        assert_eq!(LifecycleState::from(200), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_wait_for_observes_other_thread() {
        let state = StateHandle::new();
        let writer = state.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.transition(LifecycleState::Configured).unwrap();
        });
        assert!(state.wait_for(LifecycleState::Configured, Duration::from_secs(2)));
        t.join().unwrap();
        assert!(!state.wait_for(LifecycleState::Running, Duration::from_millis(10)));
    }

    #[test]
    fn test_wait_for_unbounded_timeout() {
        let state = StateHandle::new();
        let writer = state.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.transition(LifecycleState::Configured).unwrap();
        });
        assert!(state.wait_for(LifecycleState::Configured, Duration::MAX));
        t.join().unwrap();
    }
}
