//! Configuration loading from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::schema::ConfigurationKeySchema;
use crate::config::store::ConfigStore;
use crate::config::validation::{validate_schema, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    UnsupportedValue { key: String, found: &'static str },
    Validation(Vec<ValidationError>),
    StaticKey(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::UnsupportedValue { key, found } => {
                write!(f, "{}: unsupported value type {}", key, found)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::StaticKey(key) => {
                write!(f, "{} is static and cannot change while running", key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Build a store from the schema and an optional TOML override file.
///
/// The schema itself is validated first; a bad schema is reported the same
/// way as bad overrides.
pub fn load_config(
    schema: ConfigurationKeySchema,
    path: Option<&Path>,
) -> Result<ConfigStore, ConfigError> {
    validate_schema(&schema).map_err(ConfigError::Validation)?;

    let mut store = ConfigStore::new(schema);
    if let Some(path) = path {
        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        let overrides = parse_overrides(&content)?;
        tracing::debug!(path = %path.display(), count = overrides.len(), "Loaded configuration overrides");
        store.apply_overrides(overrides).map_err(ConfigError::Validation)?;
    }
    Ok(store)
}

/// Parse a TOML document into flat `"Key.Name" -> value` pairs.
///
/// Both `"TRX.Port" = 5700` and `[TRX]` / `Port = 5700` spell the same key.
pub fn parse_overrides(content: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let table: toml::Table = toml::from_str(content).map_err(ConfigError::Parse)?;
    let mut out = BTreeMap::new();
    flatten("", &table, &mut out)?;
    Ok(out)
}

fn flatten(
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    for (k, v) in table {
        let key = if prefix.is_empty() {
            k.clone()
        } else {
            format!("{}.{}", prefix, k)
        };
        let value = match v {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            toml::Value::Float(f) => f.to_string(),
            toml::Value::Boolean(b) => b.to_string(),
            toml::Value::Table(t) => {
                flatten(&key, t, out)?;
                continue;
            }
            toml::Value::Array(_) => {
                return Err(ConfigError::UnsupportedValue { key, found: "array" })
            }
            toml::Value::Datetime(_) => {
                return Err(ConfigError::UnsupportedValue { key, found: "datetime" })
            }
        };
        out.insert(key, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{build_schema, KEY_LOG_LEVEL, KEY_TRX_PORT, KEY_TX_ATTEN_OFFSET};
    use std::io::Write;

    #[test]
    fn test_parse_quoted_and_nested_keys() {
        let overrides = parse_overrides(
            r#"
            "Log.Level" = "DEBUG"

            [TRX]
            Port = 5800
            TxAttenOffset = 12.5
            "#,
        )
        .unwrap();
        assert_eq!(overrides.get(KEY_LOG_LEVEL).unwrap(), "DEBUG");
        assert_eq!(overrides.get(KEY_TRX_PORT).unwrap(), "5800");
        assert_eq!(overrides.get(KEY_TX_ATTEN_OFFSET).unwrap(), "12.5");
    }

    #[test]
    fn test_parse_rejects_arrays() {
        let err = parse_overrides(r#""TRX.IP" = ["a", "b"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let store = load_config(build_schema(), None).unwrap();
        assert_eq!(store.get_num(KEY_TRX_PORT).unwrap(), 5700);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"TRX.Port\" = 6000").unwrap();
        let store = load_config(build_schema(), Some(file.path())).unwrap();
        assert_eq!(store.get_num(KEY_TRX_PORT).unwrap(), 6000);
    }

    #[test]
    fn test_load_reports_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "\"TRX.RadioFrequencyOffset\" = 10").unwrap();
        let err = load_config(build_schema(), Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(build_schema(), Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
