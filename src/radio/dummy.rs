//! Dummy-load radio device.
//!
//! Produces low-level noise at the nominal rate without any hardware, for
//! bench runs and tests.
//!
//! Device arguments are comma separated `key=value` pairs:
//! - `mode=normal|resamp|unsupported`: capability to report (default `normal`)
//! - `code=<n>`: raw capability code, overrides `mode`
//! - `rate=<samples/s>`: sample rate (default depends on mode)
//! - `fail=1`: make `open` fail

use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::radio::device::{DeviceError, DeviceOpenError, RadioDevice};
use crate::radio::types::{RadioCapability, Sample};

/// GSM symbol rate, 1625000/6 symbols per second.
pub const GSM_SYMBOL_RATE: f64 = 1_625_000.0 / 6.0;

/// Fixed rate of devices that need resampling.
pub const RESAMPLED_DEVICE_RATE: f64 = 400_000.0;

const NOISE_AMPLITUDE: f32 = 0.01;

#[derive(Debug)]
pub struct DummyLoad {
    samples_per_symbol: usize,
    rate: f64,
    opened: bool,
    streaming: bool,
    timestamp: u64,
    frequency_offset: i64,
    tx_attenuation: f64,
}

impl DummyLoad {
    pub fn new(samples_per_symbol: usize) -> Self {
        Self {
            samples_per_symbol: samples_per_symbol.max(1),
            rate: GSM_SYMBOL_RATE * samples_per_symbol.max(1) as f64,
            opened: false,
            streaming: false,
            timestamp: 0,
            frequency_offset: 0,
            tx_attenuation: 0.0,
        }
    }

    pub fn frequency_offset(&self) -> i64 {
        self.frequency_offset
    }

    pub fn tx_attenuation(&self) -> f64 {
        self.tx_attenuation
    }
}

fn invalid(args: &str, reason: impl Into<String>) -> DeviceOpenError {
    DeviceOpenError::InvalidArgs {
        args: args.to_string(),
        reason: reason.into(),
    }
}

impl RadioDevice for DummyLoad {
    fn open(&mut self, args: &str) -> Result<RadioCapability, DeviceOpenError> {
        let mut capability = RadioCapability::Normal;
        let mut rate = None;

        for pair in args.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid(args, format!("expected key=value, got {:?}", pair)))?;
            match key.trim() {
                "mode" => {
                    capability = match value.trim() {
                        "normal" => RadioCapability::Normal,
                        "resamp" => RadioCapability::Resampled,
                        "unsupported" => RadioCapability::Unsupported(-1),
                        other => return Err(invalid(args, format!("unknown mode {:?}", other))),
                    }
                }
                "code" => {
                    let code = value
                        .trim()
                        .parse()
                        .map_err(|_| invalid(args, "code must be an integer"))?;
                    capability = RadioCapability::from_code(code);
                }
                "rate" => {
                    let r: f64 = value
                        .trim()
                        .parse()
                        .map_err(|_| invalid(args, "rate must be a number"))?;
                    if !(r.is_finite() && r > 0.0) {
                        return Err(invalid(args, "rate must be positive"));
                    }
                    rate = Some(r);
                }
                "fail" if value.trim() == "1" => {
                    return Err(DeviceOpenError::NotFound {
                        args: args.to_string(),
                    });
                }
                "fail" => {}
                other => return Err(invalid(args, format!("unknown key {:?}", other))),
            }
        }

        self.rate = rate.unwrap_or(match capability {
            RadioCapability::Resampled => RESAMPLED_DEVICE_RATE,
            _ => GSM_SYMBOL_RATE * self.samples_per_symbol as f64,
        });
        self.opened = true;

        tracing::info!(capability = %capability, rate = self.rate, "Dummy load opened");
        Ok(capability)
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        if !self.opened {
            return Err(DeviceError::NotOpen);
        }
        self.streaming = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.streaming = false;
    }

    fn read_samples(&mut self, buf: &mut [Sample]) -> Result<(usize, u64), DeviceError> {
        if !self.streaming {
            return Err(DeviceError::NotStreaming);
        }

        let mut rng = rand::thread_rng();
        for s in buf.iter_mut() {
            s.i = rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE);
            s.q = rng.gen_range(-NOISE_AMPLITUDE..NOISE_AMPLITUDE);
        }

        // Pace to the nominal rate.
        thread::sleep(Duration::from_secs_f64(buf.len() as f64 / self.rate));

        let ts = self.timestamp;
        self.timestamp += buf.len() as u64;
        Ok((buf.len(), ts))
    }

    fn sample_rate(&self) -> f64 {
        self.rate
    }

    fn set_frequency_offset(&mut self, steps: i64) -> Result<(), DeviceError> {
        self.frequency_offset = steps;
        Ok(())
    }

    fn set_tx_attenuation(&mut self, db: f64) -> Result<(), DeviceError> {
        if !(0.0..=100.0).contains(&db) {
            return Err(DeviceError::Tuning {
                value: db,
                reason: "attenuation outside 0..100 dB".into(),
            });
        }
        self.tx_attenuation = db;
        Ok(())
    }
}
