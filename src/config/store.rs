//! String-keyed configuration store backed by the key schema.

use std::collections::BTreeMap;

use crate::config::loader::ConfigError;
use crate::config::schema::ConfigurationKeySchema;
use crate::config::validation::{parse_bool, ValidationError, ValidationRule};

/// Typed access to configuration values.
///
/// Every key in the schema always has a value: an override if one was
/// loaded or set, otherwise the schema default.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    schema: ConfigurationKeySchema,
    overrides: BTreeMap<String, String>,
    frozen: bool,
}

impl ConfigStore {
    /// Create a store holding only schema defaults.
    pub fn new(schema: ConfigurationKeySchema) -> Self {
        Self {
            schema,
            overrides: BTreeMap::new(),
            frozen: false,
        }
    }

    pub fn schema(&self) -> &ConfigurationKeySchema {
        &self.schema
    }

    /// Validate and apply a batch of overrides.
    ///
    /// Nothing is applied unless every entry is valid.
    pub fn apply_overrides(
        &mut self,
        overrides: BTreeMap<String, String>,
    ) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        for (name, value) in &overrides {
            if let Err(e) = self.check(name, value) {
                errors.push(e);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        for (name, value) in overrides {
            let value = value.trim().to_string();
            tracing::debug!(key = %name, value = %value, "Configuration override");
            self.overrides.insert(name, value);
        }
        Ok(())
    }

    /// Set a single value.
    ///
    /// Once the store is frozen, static keys can no longer change.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        self.check(name, value)
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        let static_key = self
            .schema
            .get(name)
            .map(|d| d.static_at_runtime)
            .unwrap_or(false);
        if self.frozen && static_key {
            return Err(ConfigError::StaticKey(name.to_string()));
        }

        self.overrides.insert(name.to_string(), value.trim().to_string());
        Ok(())
    }

    /// Mark the service live: static keys become read-only.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Whether `name` is still at its schema default.
    pub fn is_default(&self, name: &str) -> bool {
        !self.overrides.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Result<&str, ValidationError> {
        if let Some(v) = self.overrides.get(name) {
            return Ok(v.as_str());
        }
        self.schema
            .get(name)
            .map(|d| d.default_value.as_str())
            .ok_or_else(|| ValidationError::UnknownKey(name.to_string()))
    }

    pub fn get_num(&self, name: &str) -> Result<i64, ValidationError> {
        let value = self.get_str(name)?.trim();
        if let Ok(n) = value.parse::<i64>() {
            return Ok(n);
        }
        // Whole-valued floats such as "128.0" are accepted.
        match value.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
            _ => Err(ValidationError::NotANumber {
                key: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn get_float(&self, name: &str) -> Result<f64, ValidationError> {
        let value = self.get_str(name)?.trim();
        value.parse().map_err(|_| ValidationError::NotANumber {
            key: name.to_string(),
            value: value.to_string(),
        })
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, ValidationError> {
        let value = self.get_str(name)?;
        parse_bool(value).ok_or_else(|| ValidationError::Invalid {
            key: name.to_string(),
            value: value.to_string(),
            expected: "boolean",
        })
    }

    fn check(&self, name: &str, value: &str) -> Result<(), ValidationError> {
        let descriptor = self
            .schema
            .get(name)
            .ok_or_else(|| ValidationError::UnknownKey(name.to_string()))?;
        let rule = ValidationRule::parse(descriptor.validation_kind, &descriptor.validation_spec)
            .map_err(|e| ValidationError::Spec {
                key: name.to_string(),
                source: Box::new(e),
            })?;
        rule.check(name, value)
    }
}
