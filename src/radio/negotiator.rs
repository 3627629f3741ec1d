//! Device open and capability negotiation.

use crate::radio::device::{DeviceOpenError, RadioDevice, RadioDeviceHandle};
use crate::radio::types::RadioCapability;

/// Factory calibration applied right after open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioTuning {
    /// Master clock trim, ~170 Hz per step.
    pub frequency_offset: i64,
    /// Transmit attenuation in dB.
    pub tx_attenuation_db: f64,
}

impl Default for RadioTuning {
    fn default() -> Self {
        Self {
            frequency_offset: 128,
            tx_attenuation_db: 0.0,
        }
    }
}

/// Open `device` with `device_args` and report its capability.
///
/// Exactly one open attempt is made. The capability returned here is the
/// only input to interface selection.
pub fn open_and_negotiate(
    mut device: Box<dyn RadioDevice>,
    device_args: &str,
    tuning: RadioTuning,
) -> Result<(RadioDeviceHandle, RadioCapability), DeviceOpenError> {
    tracing::debug!(args = %device_args, "Opening radio device");

    let capability = device.open(device_args)?;

    device
        .set_frequency_offset(tuning.frequency_offset)
        .map_err(DeviceOpenError::Tuning)?;
    device
        .set_tx_attenuation(tuning.tx_attenuation_db)
        .map_err(DeviceOpenError::Tuning)?;

    tracing::info!(
        capability = %capability,
        sample_rate = device.sample_rate(),
        frequency_offset = tuning.frequency_offset,
        tx_attenuation_db = tuning.tx_attenuation_db,
        "Radio device negotiated"
    );

    Ok((RadioDeviceHandle::new(device, device_args), capability))
}
