//! Radio interface strategies and capability-driven selection.
//!
//! # Strategies
//! - Normal: device already runs at the symbol-multiple rate; samples are
//!   forwarded in burst-sized blocks
//! - Resampled: device runs at a fixed rate; samples pass through a 96→65
//!   rational resampler before being cut into bursts
//!
//! # Design Decisions
//! - Closed set: `select` is the only way to build a strategy
//! - Each strategy exclusively owns the device and the receive queue
//! - A pump thread moves samples device → queue while started; it borrows
//!   the strategy, so it cannot outlive it

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, Scope, ScopedJoinHandle};

use parking_lot::Mutex;
use thiserror::Error;

use crate::observability::metrics;
use crate::radio::device::{DeviceError, RadioDeviceHandle};
use crate::radio::queue::SampleQueue;
use crate::radio::resampler::{Resampler, RESAMP_INRATE, RESAMP_OUTRATE};
use crate::radio::types::{RadioBurst, RadioCapability, Sample};

/// Symbols per burst period (156.25 rounded down).
pub const BURST_SYMBOLS: usize = 156;

/// The negotiated capability has no matching strategy.
#[derive(Debug, Error)]
#[error("unsupported radio configuration: {capability}")]
pub struct UnsupportedCapabilityError {
    pub capability: RadioCapability,
}

/// Construction parameters shared by both strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceParams {
    /// Added to device timestamps on receive.
    pub receive_offset: u64,
    pub samples_per_symbol: usize,
    /// Receive queue capacity in bursts.
    pub queue_depth: usize,
}

impl Default for InterfaceParams {
    fn default() -> Self {
        Self {
            receive_offset: 3,
            samples_per_symbol: 1,
            queue_depth: 64,
        }
    }
}

impl InterfaceParams {
    /// Samples per burst at the GSM-side rate.
    pub fn burst_len(&self) -> usize {
        BURST_SYMBOLS * self.samples_per_symbol.max(1)
    }
}

/// State common to both strategies.
#[derive(Debug)]
struct InterfaceCore {
    device: Mutex<RadioDeviceHandle>,
    queue: SampleQueue,
    params: InterfaceParams,
    running: AtomicBool,
    samples_read: AtomicU64,
}

impl InterfaceCore {
    fn new(device: RadioDeviceHandle, params: InterfaceParams) -> Self {
        Self {
            device: Mutex::new(device),
            queue: SampleQueue::with_capacity(params.queue_depth),
            params,
            running: AtomicBool::new(false),
            samples_read: AtomicU64::new(0),
        }
    }

    fn read(&self, buf: &mut [Sample]) -> Result<(usize, u64), DeviceError> {
        let (n, ts) = self.device.lock().read_samples(buf)?;
        self.samples_read.fetch_add(n as u64, Ordering::Relaxed);
        metrics::record_samples_read(n);
        Ok((n, ts))
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Interface for devices at the native rate.
#[derive(Debug)]
pub struct NormalRateInterface {
    core: InterfaceCore,
}

impl NormalRateInterface {
    fn pump(&self) {
        let core = &self.core;
        let mut buf = vec![Sample::default(); core.params.burst_len()];

        while core.is_running() {
            match core.read(&mut buf) {
                Ok((0, _)) => continue,
                Ok((n, ts)) => {
                    let burst = RadioBurst::new(ts + core.params.receive_offset, buf[..n].to_vec());
                    core.queue.push(burst);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Radio receive failed, pump exiting");
                    break;
                }
            }
        }
    }
}

/// Interface for fixed-rate devices that need resampling.
#[derive(Debug)]
pub struct ResampledInterface {
    core: InterfaceCore,
}

impl ResampledInterface {
    fn pump(&self) {
        let core = &self.core;
        let burst_len = core.params.burst_len();
        let chunk = (burst_len * RESAMP_INRATE as usize).div_ceil(RESAMP_OUTRATE as usize);
        let mut buf = vec![Sample::default(); chunk];
        let mut resampler = Resampler::new(RESAMP_INRATE, RESAMP_OUTRATE);
        let mut pending: Vec<Sample> = Vec::with_capacity(burst_len * 2);
        // Timestamp of pending[0] in output-rate samples.
        let mut out_ts: Option<u64> = None;

        while core.is_running() {
            let (n, ts) = match core.read(&mut buf) {
                Ok((0, _)) => continue,
                Ok(r) => r,
                Err(e) => {
                    tracing::error!(error = %e, "Radio receive failed, pump exiting");
                    break;
                }
            };

            let base = *out_ts.get_or_insert(ts * RESAMP_OUTRATE as u64 / RESAMP_INRATE as u64);
            resampler.process(&buf[..n], &mut pending);

            let mut emitted = 0;
            while pending.len() - emitted >= burst_len {
                let samples = pending[emitted..emitted + burst_len].to_vec();
                let stamp = base + emitted as u64 + core.params.receive_offset;
                core.queue.push(RadioBurst::new(stamp, samples));
                emitted += burst_len;
            }
            pending.drain(..emitted);
            out_ts = Some(base + emitted as u64);
        }
    }
}

/// A radio interface matched to the negotiated capability.
#[derive(Debug)]
pub enum InterfaceStrategy {
    Normal(NormalRateInterface),
    Resampled(ResampledInterface),
}

/// Build the strategy for `capability` around the opened device.
///
/// On error the device handle is dropped, releasing the device.
pub fn select(
    capability: RadioCapability,
    device: RadioDeviceHandle,
    params: InterfaceParams,
) -> Result<InterfaceStrategy, UnsupportedCapabilityError> {
    let strategy = match capability {
        RadioCapability::Normal => InterfaceStrategy::Normal(NormalRateInterface {
            core: InterfaceCore::new(device, params),
        }),
        RadioCapability::Resampled => InterfaceStrategy::Resampled(ResampledInterface {
            core: InterfaceCore::new(device, params),
        }),
        RadioCapability::Unsupported(_) => {
            return Err(UnsupportedCapabilityError { capability });
        }
    };

    tracing::info!(
        strategy = strategy.name(),
        burst_len = params.burst_len(),
        queue_depth = params.queue_depth,
        "Radio interface selected"
    );
    Ok(strategy)
}

impl InterfaceStrategy {
    fn core(&self) -> &InterfaceCore {
        match self {
            InterfaceStrategy::Normal(i) => &i.core,
            InterfaceStrategy::Resampled(i) => &i.core,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InterfaceStrategy::Normal(_) => "normal",
            InterfaceStrategy::Resampled(_) => "resampled",
        }
    }

    /// The capability this strategy serves.
    pub fn capability(&self) -> RadioCapability {
        match self {
            InterfaceStrategy::Normal(_) => RadioCapability::Normal,
            InterfaceStrategy::Resampled(_) => RadioCapability::Resampled,
        }
    }

    /// Queue carrying received bursts to the transceiver.
    pub fn receive_queue(&self) -> &SampleQueue {
        &self.core().queue
    }

    pub fn params(&self) -> InterfaceParams {
        self.core().params
    }

    /// Total samples read from the device.
    pub fn samples_read(&self) -> u64 {
        self.core().samples_read.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.core().is_running()
    }

    /// Start device streaming and the pump thread on `scope`.
    pub fn start<'scope>(
        &'scope self,
        scope: &'scope Scope<'scope, '_>,
    ) -> Result<PumpHandle<'scope>, DeviceError> {
        let core = self.core();
        core.device.lock().start()?;
        core.running.store(true, Ordering::Relaxed);

        let spawned = thread::Builder::new()
            .name("radio-pump".into())
            .spawn_scoped(scope, move || match self {
                InterfaceStrategy::Normal(i) => i.pump(),
                InterfaceStrategy::Resampled(i) => i.pump(),
            });

        let handle = match spawned {
            Ok(h) => h,
            Err(e) => {
                core.running.store(false, Ordering::Relaxed);
                core.device.lock().stop();
                return Err(DeviceError::Io(e));
            }
        };

        tracing::debug!(strategy = self.name(), "Radio pump started");
        Ok(PumpHandle {
            core,
            handle: Some(handle),
        })
    }
}

/// Running pump. Stopping (or dropping) it halts new work entering the queue.
pub struct PumpHandle<'scope> {
    core: &'scope InterfaceCore,
    handle: Option<ScopedJoinHandle<'scope, ()>>,
}

impl PumpHandle<'_> {
    /// Stop the pump thread and device streaming. Idempotent.
    pub fn stop(&mut self) {
        self.core.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Radio pump panicked");
            }
            self.core.device.lock().stop();
            tracing::debug!("Radio pump stopped");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }
}

impl Drop for PumpHandle<'_> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::dummy::DummyLoad;
    use crate::radio::negotiator::{open_and_negotiate, RadioTuning};
    use std::time::Duration;

    fn negotiated(args: &str) -> (RadioDeviceHandle, RadioCapability) {
        open_and_negotiate(Box::new(DummyLoad::new(1)), args, RadioTuning::default()).unwrap()
    }

    #[test]
    fn test_select_normal() {
        let (dev, cap) = negotiated("");
        let s = select(cap, dev, InterfaceParams::default()).unwrap();
        assert!(matches!(s, InterfaceStrategy::Normal(_)));
        assert_eq!(s.capability(), RadioCapability::Normal);
        assert_eq!(s.receive_queue().capacity(), 64);
    }

    #[test]
    fn test_select_resampled() {
        let (dev, cap) = negotiated("mode=resamp");
        let s = select(cap, dev, InterfaceParams::default()).unwrap();
        assert!(matches!(s, InterfaceStrategy::Resampled(_)));
        assert_eq!(s.name(), "resampled");
    }

    #[test]
    fn test_select_rejects_unsupported() {
        for code in [-1, 2, 42] {
            let (dev, _) = negotiated("");
            let err = select(RadioCapability::Unsupported(code), dev, InterfaceParams::default())
                .unwrap_err();
            assert_eq!(err.capability, RadioCapability::Unsupported(code));
        }
    }

    #[test]
    fn test_select_matches_capability() {
        for cap in [RadioCapability::Normal, RadioCapability::Resampled] {
            let (dev, _) = negotiated("");
            let s = select(cap, dev, InterfaceParams::default()).unwrap();
            assert_eq!(s.capability(), cap);
        }
    }

    fn pump_some(args: &str) -> (Vec<RadioBurst>, u64) {
        let (dev, cap) = negotiated(args);
        let params = InterfaceParams {
            queue_depth: 256,
            ..InterfaceParams::default()
        };
        let s = select(cap, dev, params).unwrap();
        let mut bursts = Vec::new();
        thread::scope(|scope| {
            let mut pump = s.start(scope).unwrap();
            assert!(s.is_running());
            while bursts.len() < 5 {
                if let Some(b) = s.receive_queue().recv_timeout(Duration::from_millis(500)) {
                    bursts.push(b);
                } else {
                    break;
                }
            }
            pump.stop();
            assert!(pump.is_finished());
        });
        assert!(!s.is_running());
        (bursts, s.samples_read())
    }

    #[test]
    fn test_normal_pump_produces_bursts() {
        let (bursts, read) = pump_some("");
        assert_eq!(bursts.len(), 5);
        assert!(bursts.iter().all(|b| b.len() == BURST_SYMBOLS));
        assert_eq!(bursts[0].timestamp, 3);
        assert_eq!(bursts[1].timestamp, 3 + BURST_SYMBOLS as u64);
        assert!(read >= 5 * BURST_SYMBOLS as u64);
    }

    #[test]
    fn test_resampled_pump_produces_bursts() {
        let (bursts, _) = pump_some("mode=resamp");
        assert_eq!(bursts.len(), 5);
        assert!(bursts.iter().all(|b| b.len() == BURST_SYMBOLS));
        for pair in bursts.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, BURST_SYMBOLS as u64);
        }
    }
}
