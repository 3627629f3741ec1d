//! Lifecycle error taxonomy.

use thiserror::Error;

use crate::config::validation::ValidationError;
use crate::config::ConfigError;
use crate::lifecycle::signals::SignalInstallError;
use crate::lifecycle::state::LifecycleState;
use crate::radio::device::{DeviceError, DeviceOpenError};
use crate::radio::interface::UnsupportedCapabilityError;
use crate::transceiver::TransceiverError;

/// Process exit status after a clean shutdown.
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit status after a fatal startup failure.
pub const EXIT_FAILURE: i32 = 1;

/// Fatal startup failures. None of these are retried.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid configuration value: {0}")]
    Setting(#[from] ValidationError),

    #[error(transparent)]
    SignalInstall(#[from] SignalInstallError),

    #[error(transparent)]
    DeviceOpen(#[from] DeviceOpenError),

    #[error(transparent)]
    UnsupportedCapability(#[from] UnsupportedCapabilityError),

    #[error("radio interface failed to start: {0}")]
    RadioStart(#[source] DeviceError),

    #[error(transparent)]
    Transceiver(#[from] TransceiverError),

    #[error("invalid lifecycle transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
}

impl LifecycleError {
    /// Exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        EXIT_FAILURE
    }
}

/// Exit status for a lifecycle outcome.
pub fn exit_status<T>(result: &Result<T, LifecycleError>) -> i32 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => e.exit_code(),
    }
}
