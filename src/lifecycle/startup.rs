//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the configuration key schema before anything reads config
//! - Load and validate the configuration store
//! - Install shutdown signal handlers
//! - Resolve the service settings
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is retried
//! - Steps run in order, not concurrently
//! - Device negotiation happens later, inside the service run

use std::path::PathBuf;

use crate::config::{build_schema, load_config, ConfigStore};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::service::LifecycleSettings;
use crate::lifecycle::shutdown::ShutdownLatch;
use crate::lifecycle::signals::{install_shutdown_handlers, SignalOptions, SignalRegistration};

/// Inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    pub config_path: Option<PathBuf>,
    pub device_args: String,
    pub signals: SignalOptions,
}

/// Result of the pre-device startup steps.
#[derive(Debug)]
pub struct Prepared {
    pub store: ConfigStore,
    pub settings: LifecycleSettings,
    pub signals: SignalRegistration,
}

/// Load configuration for `options` without touching signals.
pub fn load_store(options: &StartupOptions) -> Result<ConfigStore, LifecycleError> {
    let store = load_config(build_schema(), options.config_path.as_deref())?;
    Ok(store)
}

/// Run schema registration, config loading and signal installation.
///
/// The returned store is frozen: static keys are locked from here on.
pub fn prepare(options: &StartupOptions, latch: &ShutdownLatch) -> Result<Prepared, LifecycleError> {
    let mut store = load_store(options)?;
    let settings = LifecycleSettings::from_store(&store, &options.device_args)?;
    let signals = install_shutdown_handlers(latch, options.signals)?;
    store.freeze();

    Ok(Prepared {
        store,
        settings,
        signals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::KEY_TRX_PORT;
    use crate::config::ConfigError;
    use std::io::Write;

    #[test]
    fn test_prepare_with_defaults() {
        let latch = ShutdownLatch::new();
        let prepared = prepare(&StartupOptions::default(), &latch).unwrap();
        assert!(prepared.store.is_frozen());
        assert_eq!(prepared.settings.device_args, "");
        assert_eq!(prepared.signals.len(), 2);
        prepared.signals.unregister();
    }

    #[test]
    fn test_prepare_reads_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[TRX]\nPort = 5900\nShutdownPollInterval = 100").unwrap();
        let options = StartupOptions {
            config_path: Some(file.path().to_path_buf()),
            device_args: "mode=resamp".into(),
            ..StartupOptions::default()
        };
        let latch = ShutdownLatch::new();
        let prepared = prepare(&options, &latch).unwrap();
        assert_eq!(prepared.store.get_num(KEY_TRX_PORT).unwrap(), 5900);
        assert_eq!(prepared.settings.transceiver.base_port, 5900);
        assert_eq!(prepared.settings.device_args, "mode=resamp");
        prepared.signals.unregister();
    }

    #[test]
    fn test_bad_config_fails_before_signals() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"TRX.Port\" = 0").unwrap();
        let options = StartupOptions {
            config_path: Some(file.path().to_path_buf()),
            ..StartupOptions::default()
        };
        let err = prepare(&options, &ShutdownLatch::new()).unwrap_err();
        assert!(matches!(err, LifecycleError::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn test_padded_address_is_usable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"TRX.IP\" = \" 10.0.0.1 \"").unwrap();
        let options = StartupOptions {
            config_path: Some(file.path().to_path_buf()),
            ..StartupOptions::default()
        };
        let prepared = prepare(&options, &ShutdownLatch::new()).unwrap();
        assert_eq!(
            prepared.settings.transceiver.controller_ip,
            "10.0.0.1".parse::<std::net::IpAddr>().unwrap()
        );
        prepared.signals.unregister();
    }

    #[test]
    fn test_fractional_poll_interval_rejected_at_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"TRX.ShutdownPollInterval\" = 100.5").unwrap();
        let path = file.path().to_path_buf();

        let err = load_store(&StartupOptions {
            config_path: Some(path),
            ..StartupOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, LifecycleError::Config(ConfigError::Validation(_))));
    }
}
