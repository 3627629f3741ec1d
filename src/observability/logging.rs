//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Map syslog-style `Log.Level` names onto tracing levels
//! - Emit fatal diagnostics at ALERT severity
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set
//! - Severity names without a tracing equivalent are carried as a field

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tracing level for a syslog-style severity name. Unknown names map to `info`.
pub fn tracing_level(severity: &str) -> &'static str {
    match severity.trim().to_ascii_uppercase().as_str() {
        "EMERG" | "ALERT" | "CRIT" | "ERR" | "ERROR" => "error",
        "WARNING" | "WARN" => "warn",
        "NOTICE" | "INFO" => "info",
        "DEBUG" => "debug",
        _ => "info",
    }
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(severity: &str) -> String {
    format!("{}={}", env!("CARGO_CRATE_NAME"), tracing_level(severity))
}

/// Install the global subscriber.
pub fn init_logging(severity: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(severity).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

/// Log a fatal startup error at ALERT severity.
pub fn alert(error: &dyn std::error::Error) {
    tracing::error!(severity = "ALERT", error = %error, "Transceiver exiting...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(tracing_level("ALERT"), "error");
        assert_eq!(tracing_level("ERR"), "error");
        assert_eq!(tracing_level("warning"), "warn");
        assert_eq!(tracing_level("NOTICE"), "info");
        assert_eq!(tracing_level("DEBUG"), "debug");
        assert_eq!(tracing_level("chatty"), "info");
    }

    #[test]
    fn test_default_directive_targets_crate() {
        assert_eq!(default_directive("DEBUG"), "transceiver=debug");
    }
}
