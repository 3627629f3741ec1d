//! Configuration validation.
//!
//! # Responsibilities
//! - Parse each key's validation spec under its declared kind
//! - Check values (defaults and overrides) against the parsed rule
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: schema/value in, `Result` out
//! - Runs before any value is accepted into the store

use std::fmt;
use std::net::IpAddr;

use thiserror::Error;

use crate::config::schema::{ConfigurationKeySchema, ValidationKind};

/// A parsed validation constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    /// `integer` is set when both bounds are written as integers; such
    /// ranges only admit whole values.
    Range { min: f64, max: f64, integer: bool },
    List(Vec<String>),
    IpAddress,
    Port,
    Boolean,
    Any,
}

/// Validation failure for a spec or a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("malformed {kind:?} spec {spec:?}: {reason}")]
    MalformedSpec {
        kind: ValidationKind,
        spec: String,
        reason: &'static str,
    },

    #[error("{key}: {value:?} is not a number")]
    NotANumber { key: String, value: String },

    #[error("{key}: {value:?} is not a whole number")]
    NotAnInteger { key: String, value: String },

    #[error("{key}: {value} outside range {min}:{max}")]
    OutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{key}: {value:?} is not one of {allowed}")]
    NotInList {
        key: String,
        value: String,
        allowed: String,
    },

    #[error("{key}: {value:?} is not a valid {expected}")]
    Invalid {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("{key}: invalid validation spec: {source}")]
    Spec {
        key: String,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("unknown configuration key {0:?}")]
    UnknownKey(String),
}

impl ValidationRule {
    /// Parse `spec` under `kind`.
    pub fn parse(kind: ValidationKind, spec: &str) -> Result<Self, ValidationError> {
        let malformed = |reason| ValidationError::MalformedSpec {
            kind,
            spec: spec.to_string(),
            reason,
        };

        match kind {
            ValidationKind::ValRange => {
                let (lo, hi) = spec.split_once(':').ok_or_else(|| malformed("expected min:max"))?;
                let min: f64 = lo.trim().parse().map_err(|_| malformed("bad minimum"))?;
                let max: f64 = hi.trim().parse().map_err(|_| malformed("bad maximum"))?;
                if !min.is_finite() || !max.is_finite() {
                    return Err(malformed("bounds must be finite"));
                }
                if min > max {
                    return Err(malformed("minimum exceeds maximum"));
                }
                let integer = lo.trim().parse::<i64>().is_ok() && hi.trim().parse::<i64>().is_ok();
                Ok(ValidationRule::Range { min, max, integer })
            }
            ValidationKind::ValList => {
                let items: Vec<String> = spec
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if items.is_empty() {
                    return Err(malformed("empty list"));
                }
                Ok(ValidationRule::List(items))
            }
            ValidationKind::IpAddress => Ok(ValidationRule::IpAddress),
            ValidationKind::Port => Ok(ValidationRule::Port),
            ValidationKind::Boolean => Ok(ValidationRule::Boolean),
            ValidationKind::String => Ok(ValidationRule::Any),
        }
    }

    /// Check `value` for key `key` against this rule.
    pub fn check(&self, key: &str, value: &str) -> Result<(), ValidationError> {
        let value = value.trim();
        match self {
            ValidationRule::Range { min, max, integer } => {
                let n: f64 = value.parse().map_err(|_| ValidationError::NotANumber {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                if *integer && n.fract() != 0.0 {
                    return Err(ValidationError::NotAnInteger {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                if n < *min || n > *max || n.is_nan() {
                    return Err(ValidationError::OutOfRange {
                        key: key.to_string(),
                        value: n,
                        min: *min,
                        max: *max,
                    });
                }
                Ok(())
            }
            ValidationRule::List(items) => {
                if items.iter().any(|i| i == value) {
                    Ok(())
                } else {
                    Err(ValidationError::NotInList {
                        key: key.to_string(),
                        value: value.to_string(),
                        allowed: items.join(","),
                    })
                }
            }
            ValidationRule::IpAddress => value
                .parse::<IpAddr>()
                .map(|_| ())
                .map_err(|_| invalid(key, value, "IP address")),
            ValidationRule::Port => match value.parse::<u16>() {
                Ok(p) if p != 0 => Ok(()),
                _ => Err(invalid(key, value, "port")),
            },
            ValidationRule::Boolean => parse_bool(value)
                .map(|_| ())
                .ok_or_else(|| invalid(key, value, "boolean")),
            ValidationRule::Any => Ok(()),
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Range { min, max, .. } => write!(f, "{}:{}", min, max),
            ValidationRule::List(items) => write!(f, "{}", items.join(",")),
            ValidationRule::IpAddress => write!(f, "ip address"),
            ValidationRule::Port => write!(f, "port"),
            ValidationRule::Boolean => write!(f, "boolean"),
            ValidationRule::Any => write!(f, "any"),
        }
    }
}

fn invalid(key: &str, value: &str, expected: &'static str) -> ValidationError {
    ValidationError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Parse the boolean spellings accepted by the store.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Check every descriptor: its spec parses and its default satisfies it.
pub fn validate_schema(schema: &ConfigurationKeySchema) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for d in schema.iter() {
        match ValidationRule::parse(d.validation_kind, &d.validation_spec) {
            Ok(rule) => {
                if let Err(e) = rule.check(&d.name, &d.default_value) {
                    errors.push(e);
                }
            }
            Err(e) => errors.push(ValidationError::Spec {
                key: d.name.clone(),
                source: Box::new(e),
            }),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ConfigurationKeyDescriptor, Visibility};

    #[test]
    fn test_parse_range() {
        let rule = ValidationRule::parse(ValidationKind::ValRange, "96:160").unwrap();
        assert_eq!(
            rule,
            ValidationRule::Range {
                min: 96.0,
                max: 160.0,
                integer: true
            }
        );
        assert_eq!(rule.to_string(), "96:160");
    }

    #[test]
    fn test_integer_range_rejects_fractions() {
        let rule = ValidationRule::parse(ValidationKind::ValRange, "10:5000").unwrap();
        assert!(rule.check("k", "100").is_ok());
        assert!(rule.check("k", "100.0").is_ok());
        assert!(matches!(
            rule.check("k", "100.5"),
            Err(ValidationError::NotAnInteger { .. })
        ));

        let fractional = ValidationRule::parse(ValidationKind::ValRange, "0.5:2.5").unwrap();
        assert!(matches!(fractional, ValidationRule::Range { integer: false, .. }));
        assert!(fractional.check("k", "1.25").is_ok());
    }

    #[test]
    fn test_parse_range_rejects_malformed() {
        for spec in ["", "96", "a:b", "160:96", "1:inf"] {
            assert!(
                ValidationRule::parse(ValidationKind::ValRange, spec).is_err(),
                "{spec:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_range_check() {
        let rule = ValidationRule::parse(ValidationKind::ValRange, "0:100").unwrap();
        assert!(rule.check("k", "0").is_ok());
        assert!(rule.check("k", "100").is_ok());
        assert!(rule.check("k", " 42 ").is_ok());
        assert!(matches!(
            rule.check("k", "101"),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            rule.check("k", "loud"),
            Err(ValidationError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_list_check() {
        let rule = ValidationRule::parse(ValidationKind::ValList, "A, B ,C").unwrap();
        assert!(rule.check("k", "B").is_ok());
        assert!(rule.check("k", "D").is_err());
        assert!(ValidationRule::parse(ValidationKind::ValList, " , ").is_err());
    }

    #[test]
    fn test_address_port_bool() {
        let ip = ValidationRule::parse(ValidationKind::IpAddress, "").unwrap();
        assert!(ip.check("k", "127.0.0.1").is_ok());
        assert!(ip.check("k", "::1").is_ok());
        assert!(ip.check("k", "localhost").is_err());

        let port = ValidationRule::parse(ValidationKind::Port, "").unwrap();
        assert!(port.check("k", "5700").is_ok());
        assert!(port.check("k", "0").is_err());
        assert!(port.check("k", "70000").is_err());

        let b = ValidationRule::parse(ValidationKind::Boolean, "").unwrap();
        assert!(b.check("k", "on").is_ok());
        assert!(b.check("k", "maybe").is_err());
    }

    #[test]
    fn test_validate_schema_collects_all_errors() {
        let mut schema = ConfigurationKeySchema::new();
        let bad = |name: &str, default: &str, spec: &str| ConfigurationKeyDescriptor {
            name: name.to_string(),
            default_value: default.to_string(),
            units: String::new(),
            visibility: Visibility::Developer,
            validation_kind: ValidationKind::ValRange,
            validation_spec: spec.to_string(),
            static_at_runtime: true,
            description: String::new(),
        };
        schema.insert(bad("A", "5", "10:1"));
        schema.insert(bad("B", "50", "0:10"));
        schema.insert(bad("C", "5", "0:10"));

        let errors = validate_schema(&schema).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::Spec { .. }));
        assert!(matches!(errors[1], ValidationError::OutOfRange { .. }));
    }
}
