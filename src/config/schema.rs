//! Configuration key schema.
//!
//! Every tunable the transceiver reads is described here: name, default,
//! units, who may change it, how its value is validated and whether it can
//! change while the service is running. The store consults this registry to
//! validate persisted values and to supply defaults for unset keys.

use std::collections::BTreeMap;

use serde::Serialize;

/// Who is expected to adjust a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    /// Set at the factory; needs calibration equipment.
    Factory,
    /// Ordinary customer setting.
    Customer,
    /// Site-specific customer setting.
    CustomerSite,
    /// Customer tuning parameter.
    CustomerTune,
    /// Customer setting that warrants a warning before change.
    CustomerWarn,
    /// Developer/debug knob.
    Developer,
}

/// How a key's value is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationKind {
    /// Numeric range, spec `"min:max"`.
    ValRange,
    /// One of a fixed list, spec `"A,B,C"`.
    ValList,
    /// IPv4/IPv6 address.
    IpAddress,
    /// TCP/UDP port number.
    Port,
    /// `true`/`false` (also `1`/`0`).
    Boolean,
    /// Free-form string.
    String,
}

/// Description of a single configuration key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationKeyDescriptor {
    pub name: String,
    pub default_value: String,
    pub units: String,
    pub visibility: Visibility,
    pub validation_kind: ValidationKind,
    /// Kind-specific constraint encoding.
    pub validation_spec: String,
    /// The value cannot change while the service is running.
    pub static_at_runtime: bool,
    pub description: String,
}

/// Registry of configuration keys, keyed by name.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConfigurationKeySchema {
    keys: BTreeMap<String, ConfigurationKeyDescriptor>,
}

impl ConfigurationKeySchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor.
    ///
    /// Duplicate names are a programming error: debug builds panic, release
    /// builds keep the first registration.
    pub fn insert(&mut self, descriptor: ConfigurationKeyDescriptor) {
        debug_assert!(
            !self.keys.contains_key(&descriptor.name),
            "duplicate configuration key {}",
            descriptor.name
        );
        if self.keys.contains_key(&descriptor.name) {
            tracing::warn!(key = %descriptor.name, "Duplicate configuration key ignored");
            return;
        }
        self.keys.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&ConfigurationKeyDescriptor> {
        self.keys.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigurationKeyDescriptor> {
        self.keys.values()
    }
}

// Key names used by the service.
pub const KEY_LOG_LEVEL: &str = "Log.Level";
pub const KEY_TRX_PORT: &str = "TRX.Port";
pub const KEY_TRX_IP: &str = "TRX.IP";
pub const KEY_RADIO_FREQUENCY_OFFSET: &str = "TRX.RadioFrequencyOffset";
pub const KEY_TX_ATTEN_OFFSET: &str = "TRX.TxAttenOffset";
pub const KEY_SHUTDOWN_POLL_INTERVAL: &str = "TRX.ShutdownPollInterval";
pub const KEY_QUEUE_DEPTH: &str = "TRX.QueueDepth";

#[allow(clippy::too_many_arguments)]
fn key(
    name: &str,
    default_value: &str,
    units: &str,
    visibility: Visibility,
    validation_kind: ValidationKind,
    validation_spec: &str,
    static_at_runtime: bool,
    description: &str,
) -> ConfigurationKeyDescriptor {
    ConfigurationKeyDescriptor {
        name: name.to_string(),
        default_value: default_value.to_string(),
        units: units.to_string(),
        visibility,
        validation_kind,
        validation_spec: validation_spec.to_string(),
        static_at_runtime,
        description: description.to_string(),
    }
}

/// Build the transceiver's key registry.
///
/// Must run before the store reads any persisted value.
pub fn build_schema() -> ConfigurationKeySchema {
    let mut schema = ConfigurationKeySchema::new();

    schema.insert(key(
        KEY_LOG_LEVEL,
        "NOTICE",
        "",
        Visibility::Customer,
        ValidationKind::ValList,
        "EMERG,ALERT,CRIT,ERR,WARNING,NOTICE,INFO,DEBUG",
        false,
        "Default logging level when no RUST_LOG filter is set.",
    ));

    schema.insert(key(
        KEY_TRX_PORT,
        "5700",
        "",
        Visibility::CustomerWarn,
        ValidationKind::Port,
        "",
        true,
        "Base UDP port for the controller interface. \
         The transceiver uses a small block of ports starting here.",
    ));

    schema.insert(key(
        KEY_TRX_IP,
        "127.0.0.1",
        "",
        Visibility::CustomerWarn,
        ValidationKind::IpAddress,
        "",
        true,
        "IP address of the base-station controller.",
    ));

    schema.insert(key(
        KEY_RADIO_FREQUENCY_OFFSET,
        "128",
        "~170Hz steps",
        Visibility::Factory,
        ValidationKind::ValRange,
        "96:160",
        true,
        "Fine-tuning adjustment for the transceiver master clock. \
         Roughly 170 Hz/step. Set at the factory. \
         Do not adjust without proper calibration.",
    ));

    schema.insert(key(
        KEY_TX_ATTEN_OFFSET,
        "0",
        "dB of attenuation",
        Visibility::Factory,
        ValidationKind::ValRange,
        "0:100",
        true,
        "Hardware-specific gain adjustment for the transmitter, matched to the \
         power amplifier, expressed as an attenuation in dB. Set at the factory. \
         Do not adjust without proper calibration.",
    ));

    schema.insert(key(
        KEY_SHUTDOWN_POLL_INTERVAL,
        "1000",
        "milliseconds",
        Visibility::Developer,
        ValidationKind::ValRange,
        "10:5000",
        true,
        "How often the control loop checks for a shutdown request.",
    ));

    schema.insert(key(
        KEY_QUEUE_DEPTH,
        "64",
        "bursts",
        Visibility::Developer,
        ValidationKind::ValRange,
        "4:4096",
        true,
        "Capacity of the receive sample queue between the radio interface \
         and the transceiver.",
    ));

    schema
}
