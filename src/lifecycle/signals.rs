//! OS signal handling.
//!
//! # Responsibilities
//! - Register handlers for SIGINT and SIGTERM
//! - Route both to the same action: set the shutdown latch
//!
//! # Design Decisions
//! - Uses `signal_hook::flag`, whose handler is a single atomic store
//! - Optional forced exit when a second signal arrives after the latch is set
//! - Any other signal keeps its default disposition

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::SigId;
use thiserror::Error;

use crate::lifecycle::shutdown::ShutdownLatch;

/// Signals that request shutdown.
pub const SHUTDOWN_SIGNALS: [i32; 2] = [SIGINT, SIGTERM];

/// Exit status used for a forced exit on a repeated signal.
pub const FORCED_EXIT_STATUS: i32 = 1;

/// A shutdown handler could not be registered.
#[derive(Debug, Error)]
#[error("couldn't install signal handler for {name}: {source}")]
pub struct SignalInstallError {
    pub name: &'static str,
    #[source]
    pub source: std::io::Error,
}

/// Handler registration options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalOptions {
    /// Exit immediately if a shutdown signal arrives while the latch is already set.
    pub force_exit_on_repeat: bool,
}

/// Registered handler ids.
///
/// Handlers are meant to live for the whole process; `unregister` exists
/// for embedding and tests.
#[derive(Debug)]
pub struct SignalRegistration {
    ids: Vec<SigId>,
}

impl SignalRegistration {
    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove all actions registered by this call.
    pub fn unregister(self) {
        for id in self.ids {
            signal_hook::low_level::unregister(id);
        }
    }
}

fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGINT => "SIGINT",
        SIGTERM => "SIGTERM",
        _ => "unknown signal",
    }
}

/// Register SIGINT and SIGTERM to set `latch`.
pub fn install_shutdown_handlers(
    latch: &ShutdownLatch,
    options: SignalOptions,
) -> Result<SignalRegistration, SignalInstallError> {
    let mut ids = Vec::with_capacity(SHUTDOWN_SIGNALS.len() * 2);

    for signal in SHUTDOWN_SIGNALS {
        let name = signal_name(signal);

        // The conditional exit must be registered first so it sees the
        // latch value from before this delivery.
        if options.force_exit_on_repeat {
            let id = signal_hook::flag::register_conditional_shutdown(
                signal,
                FORCED_EXIT_STATUS,
                latch.flag(),
            )
            .map_err(|source| SignalInstallError { name, source })?;
            ids.push(id);
        }

        let id = signal_hook::flag::register(signal, latch.flag())
            .map_err(|source| SignalInstallError { name, source })?;
        ids.push(id);

        tracing::debug!(signal = name, "Shutdown handler installed");
    }

    Ok(SignalRegistration { ids })
}
