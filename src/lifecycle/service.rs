//! Transceiver service: negotiate, run until shutdown, tear down in order.

use std::net::IpAddr;
use std::thread::{self, Scope};
use std::time::{Duration, Instant};

use crate::config::schema::{
    KEY_QUEUE_DEPTH, KEY_RADIO_FREQUENCY_OFFSET, KEY_SHUTDOWN_POLL_INTERVAL, KEY_TRX_IP,
    KEY_TRX_PORT, KEY_TX_ATTEN_OFFSET,
};
use crate::config::validation::ValidationError;
use crate::config::ConfigStore;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::shutdown::ShutdownLatch;
use crate::lifecycle::state::{LifecycleState, StateHandle};
use crate::radio::device::RadioDevice;
use crate::radio::interface::{self, InterfaceParams, InterfaceStrategy};
use crate::radio::negotiator::{open_and_negotiate, RadioTuning};
use crate::radio::types::RadioCapability;
use crate::transceiver::{BurstSink, GsmTime, Transceiver, TransceiverParams};

/// Samples per symbol used by the receive path.
pub const SAMPLES_PER_SYMBOL: usize = 1;

/// Everything the service needs, resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleSettings {
    /// Forwarded verbatim to the device open call.
    pub device_args: String,
    pub tuning: RadioTuning,
    pub interface: InterfaceParams,
    pub transceiver: TransceiverParams,
    pub poll_interval: Duration,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            device_args: String::new(),
            tuning: RadioTuning::default(),
            interface: InterfaceParams::default(),
            transceiver: TransceiverParams::default(),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl LifecycleSettings {
    /// Resolve settings from a validated store.
    pub fn from_store(store: &ConfigStore, device_args: &str) -> Result<Self, ValidationError> {
        let ip_str = store.get_str(KEY_TRX_IP)?;
        let controller_ip: IpAddr = ip_str.parse().map_err(|_| ValidationError::Invalid {
            key: KEY_TRX_IP.to_string(),
            value: ip_str.to_string(),
            expected: "IP address",
        })?;

        let port = store.get_num(KEY_TRX_PORT)?;
        let base_port = u16::try_from(port).map_err(|_| ValidationError::Invalid {
            key: KEY_TRX_PORT.to_string(),
            value: port.to_string(),
            expected: "port",
        })?;

        let poll_ms = store.get_num(KEY_SHUTDOWN_POLL_INTERVAL)?.max(1) as u64;
        let queue_depth = store.get_num(KEY_QUEUE_DEPTH)?.max(1) as usize;

        Ok(Self {
            device_args: device_args.to_string(),
            tuning: RadioTuning {
                frequency_offset: store.get_num(KEY_RADIO_FREQUENCY_OFFSET)?,
                tx_attenuation_db: store.get_num(KEY_TX_ATTEN_OFFSET)? as f64,
            },
            interface: InterfaceParams {
                receive_offset: 3,
                samples_per_symbol: SAMPLES_PER_SYMBOL,
                queue_depth,
            },
            transceiver: TransceiverParams {
                base_port,
                controller_ip,
                samples_per_symbol: SAMPLES_PER_SYMBOL,
                start_time: GsmTime::new(3, 0),
            },
            poll_interval: Duration::from_millis(poll_ms),
        })
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct ShutdownReport {
    pub capability: RadioCapability,
    pub strategy: &'static str,
    pub bursts_consumed: u64,
    pub samples_consumed: u64,
    pub samples_read: u64,
    pub queue_overruns: u64,
    pub run_time: Duration,
}

/// One-shot transceiver lifecycle.
///
/// `run` consumes the lifecycle, so the service runs at most once.
pub struct TransceiverLifecycle {
    settings: LifecycleSettings,
    latch: ShutdownLatch,
    state: StateHandle,
}

impl TransceiverLifecycle {
    pub fn new(settings: LifecycleSettings, latch: ShutdownLatch) -> Self {
        Self {
            settings,
            latch,
            state: StateHandle::new(),
        }
    }

    /// Observer for the current state, usable from other threads.
    pub fn state_handle(&self) -> StateHandle {
        self.state.clone()
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Negotiate the device, run until the latch is set, then tear down.
    ///
    /// Teardown order: pump stopped (no new work), worker drained and
    /// joined, transceiver dropped, interface (device and queue) released.
    pub fn run(
        self,
        device: Box<dyn RadioDevice>,
        sink: Box<dyn BurstSink>,
    ) -> Result<ShutdownReport, LifecycleError> {
        let (handle, capability) =
            open_and_negotiate(device, &self.settings.device_args, self.settings.tuning)?;
        let strategy = interface::select(capability, handle, self.settings.interface)?;

        let result = thread::scope(|scope| self.serve(scope, &strategy, sink));

        let samples_read = strategy.samples_read();
        let queue_overruns = strategy.receive_queue().overruns();
        drop(strategy);
        tracing::debug!("Radio interface released");

        let mut report = result?;
        report.samples_read = samples_read;
        report.queue_overruns = queue_overruns;

        self.state.transition(LifecycleState::Stopped)?;
        tracing::info!(
            bursts = report.bursts_consumed,
            overruns = report.queue_overruns,
            run_time_secs = report.run_time.as_secs_f64(),
            "Transceiver stopped"
        );
        Ok(report)
    }

    fn serve<'scope>(
        &self,
        scope: &'scope Scope<'scope, '_>,
        strategy: &'scope InterfaceStrategy,
        sink: Box<dyn BurstSink>,
    ) -> Result<ShutdownReport, LifecycleError> {
        let mut trx = Transceiver::new(self.settings.transceiver, sink);
        trx.bind(strategy.receive_queue());
        self.state.transition(LifecycleState::Configured)?;

        let mut pump = strategy.start(scope).map_err(LifecycleError::RadioStart)?;
        trx.start(scope)?;
        self.state.transition(LifecycleState::Running)?;
        let started = Instant::now();

        while !self.latch.is_shutdown_requested() {
            thread::sleep(self.settings.poll_interval);
        }

        tracing::info!("Received shutdown signal");
        self.state.transition(LifecycleState::ShuttingDown)?;
        tracing::info!("Shutting down transceiver...");

        pump.stop();
        trx.stop();
        let stats = trx.stats();
        drop(trx);

        Ok(ShutdownReport {
            capability: strategy.capability(),
            strategy: strategy.name(),
            bursts_consumed: stats.bursts_consumed,
            samples_consumed: stats.samples_consumed,
            samples_read: 0,
            queue_overruns: 0,
            run_time: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{build_schema, ConfigStore};
    use crate::radio::dummy::DummyLoad;
    use crate::transceiver::PowerMeter;
    use std::net::Ipv4Addr;

    #[test]
    fn test_settings_from_defaults() {
        let store = ConfigStore::new(build_schema());
        let settings = LifecycleSettings::from_store(&store, "").unwrap();
        assert_eq!(settings.device_args, "");
        assert_eq!(settings.tuning.frequency_offset, 128);
        assert_eq!(settings.tuning.tx_attenuation_db, 0.0);
        assert_eq!(settings.transceiver.base_port, 5700);
        assert_eq!(settings.transceiver.controller_ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(settings.transceiver.start_time, GsmTime::new(3, 0));
        assert_eq!(settings.interface.queue_depth, 64);
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_settings_follow_overrides() {
        let mut store = ConfigStore::new(build_schema());
        store.set(KEY_TRX_PORT, "6000").unwrap();
        store.set(KEY_SHUTDOWN_POLL_INTERVAL, "50").unwrap();
        store.set(KEY_TX_ATTEN_OFFSET, "7").unwrap();
        let settings = LifecycleSettings::from_store(&store, "mode=resamp").unwrap();
        assert_eq!(settings.device_args, "mode=resamp");
        assert_eq!(settings.transceiver.base_port, 6000);
        assert_eq!(settings.tuning.tx_attenuation_db, 7.0);
        assert_eq!(settings.poll_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_run_with_latch_already_set() {
        let latch = ShutdownLatch::new();
        latch.signal_shutdown();
        let settings = LifecycleSettings {
            poll_interval: Duration::from_millis(10),
            ..LifecycleSettings::default()
        };
        let lifecycle = TransceiverLifecycle::new(settings, latch);
        let state = lifecycle.state_handle();

        let report = lifecycle
            .run(Box::new(DummyLoad::new(1)), Box::new(PowerMeter::default()))
            .unwrap();
        assert_eq!(state.get(), LifecycleState::Stopped);
        assert_eq!(report.capability, RadioCapability::Normal);
        assert_eq!(report.strategy, "normal");
    }

    #[test]
    fn test_open_failure_stays_uninitialized() {
        let settings = LifecycleSettings {
            device_args: "fail=1".into(),
            ..LifecycleSettings::default()
        };
        let lifecycle = TransceiverLifecycle::new(settings, ShutdownLatch::new());
        let state = lifecycle.state_handle();
        let err = lifecycle
            .run(Box::new(DummyLoad::new(1)), Box::new(PowerMeter::default()))
            .unwrap_err();
        assert!(matches!(err, LifecycleError::DeviceOpen(_)));
        assert_eq!(state.get(), LifecycleState::Uninitialized);
    }
}
