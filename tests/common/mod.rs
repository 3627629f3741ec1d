//! Shared utilities for lifecycle integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use transceiver::radio::{DeviceError, DeviceOpenError, RadioBurst, RadioCapability, RadioDevice, Sample};
use transceiver::transceiver::{BurstSink, GsmTime};

/// Ordered record of device and worker events.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == event)
    }

    pub fn contains(&self, event: &str) -> bool {
        self.position(event).is_some()
    }
}

/// What `open` should do.
#[derive(Debug, Clone, Copy)]
pub enum OpenOutcome {
    Capability(RadioCapability),
    Fail,
}

/// A device whose open result is scripted and whose lifetime is logged.
pub struct ScriptedDevice {
    outcome: OpenOutcome,
    log: EventLog,
    streaming: bool,
    timestamp: u64,
}

impl ScriptedDevice {
    pub fn new(outcome: OpenOutcome, log: &EventLog) -> Self {
        Self {
            outcome,
            log: log.clone(),
            streaming: false,
            timestamp: 0,
        }
    }
}

impl RadioDevice for ScriptedDevice {
    fn open(&mut self, args: &str) -> Result<RadioCapability, DeviceOpenError> {
        self.log.push(format!("open:{}", args));
        match self.outcome {
            OpenOutcome::Capability(c) => Ok(c),
            OpenOutcome::Fail => Err(DeviceOpenError::NotFound {
                args: args.to_string(),
            }),
        }
    }

    fn start(&mut self) -> Result<(), DeviceError> {
        self.streaming = true;
        self.log.push("device started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.streaming {
            self.streaming = false;
            self.log.push("device stopped");
        }
    }

    fn read_samples(&mut self, buf: &mut [Sample]) -> Result<(usize, u64), DeviceError> {
        if !self.streaming {
            return Err(DeviceError::NotStreaming);
        }
        buf.fill(Sample::new(0.5, -0.5));
        thread::sleep(Duration::from_millis(1));
        let ts = self.timestamp;
        self.timestamp += buf.len() as u64;
        Ok((buf.len(), ts))
    }

    fn sample_rate(&self) -> f64 {
        1_625_000.0 / 6.0
    }
}

impl Drop for ScriptedDevice {
    fn drop(&mut self) {
        self.log.push("device released");
    }
}

/// Sink that logs its start/stop and counts bursts.
pub struct RecordingSink {
    log: EventLog,
    pub bursts: Arc<AtomicU64>,
}

impl RecordingSink {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            bursts: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl BurstSink for RecordingSink {
    fn started(&mut self) {
        self.log.push("worker started");
    }

    fn consume(&mut self, _time: GsmTime, _burst: RadioBurst) {
        self.bursts.fetch_add(1, Ordering::Relaxed);
    }

    fn stopped(&mut self) {
        self.log.push("worker stopped");
    }
}
