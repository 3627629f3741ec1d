//! Radio device abstraction.
//!
//! # Responsibilities
//! - Define the narrow interface to the device driver
//! - Wrap an opened device so only negotiated devices reach the interfaces
//!
//! # Design Decisions
//! - `open` is a single blocking call; no retry at this layer
//! - Tuning hooks default to no-ops for devices without the control

use std::ops::{Deref, DerefMut};

use thiserror::Error;

use crate::radio::types::{RadioCapability, Sample};

/// Failure to open or initially configure the device. Fatal at startup.
#[derive(Debug, Error)]
pub enum DeviceOpenError {
    #[error("no radio device matches {args:?}")]
    NotFound { args: String },

    #[error("invalid device arguments {args:?}: {reason}")]
    InvalidArgs { args: String, reason: String },

    #[error("device open failed: {0}")]
    Failed(String),

    #[error("device tuning failed: {0}")]
    Tuning(#[source] DeviceError),
}

/// Runtime device failure.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device not open")]
    NotOpen,

    #[error("device not streaming")]
    NotStreaming,

    #[error("stream error: {0}")]
    Stream(String),

    #[error("tuning value {value} rejected: {reason}")]
    Tuning { value: f64, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Driver-level radio device.
pub trait RadioDevice: Send {
    /// Open the device. `args` is forwarded verbatim from the command line.
    fn open(&mut self, args: &str) -> Result<RadioCapability, DeviceOpenError>;

    /// Begin streaming.
    fn start(&mut self) -> Result<(), DeviceError>;

    /// Stop streaming. Idempotent.
    fn stop(&mut self);

    /// Fill `buf`; returns the sample count and the timestamp of the first sample.
    fn read_samples(&mut self, buf: &mut [Sample]) -> Result<(usize, u64), DeviceError>;

    /// Device sample rate in samples per second.
    fn sample_rate(&self) -> f64;

    /// Master clock trim in device steps.
    fn set_frequency_offset(&mut self, _steps: i64) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Transmit attenuation in dB.
    fn set_tx_attenuation(&mut self, _db: f64) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// An opened radio device.
///
/// Only the negotiator creates these, so an interface strategy can never be
/// built around a device that was not successfully opened.
pub struct RadioDeviceHandle {
    device: Box<dyn RadioDevice>,
    args: String,
}

impl RadioDeviceHandle {
    pub(crate) fn new(device: Box<dyn RadioDevice>, args: &str) -> Self {
        Self {
            device,
            args: args.to_string(),
        }
    }

    /// Arguments the device was opened with.
    pub fn args(&self) -> &str {
        &self.args
    }
}

impl Deref for RadioDeviceHandle {
    type Target = dyn RadioDevice;
    fn deref(&self) -> &Self::Target {
        self.device.as_ref()
    }
}

impl DerefMut for RadioDeviceHandle {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.device.as_mut()
    }
}

impl std::fmt::Debug for RadioDeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadioDeviceHandle")
            .field("args", &self.args)
            .field("sample_rate", &self.device.sample_rate())
            .finish()
    }
}
