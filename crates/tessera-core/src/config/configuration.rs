use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kernel::error::{Error, Result};

/// Configuration tree handed to a component during the configure stage.
///
/// Top-level keys map to arbitrary JSON values, so documents in any of the
/// supported formats deserialize into the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    values: BTreeMap<String, serde_json::Value>,
}

impl Configuration {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: BTreeMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Get a configuration value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Raw value lookup
    pub fn value(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| Error::Other(format!("Failed to serialize configuration value '{}': {}", key, e)))?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Remove a configuration value
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All keys, sorted
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge with another configuration, overriding existing values
    pub fn merge(&mut self, other: &Configuration) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Apply `f` to every string leaf, recursing through arrays and objects.
    pub fn map_strings<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let values = self
            .values
            .into_iter()
            .map(|(key, value)| (key, map_value_strings(value, &f)))
            .collect();
        Self { values }
    }
}

fn map_value_strings<F>(value: serde_json::Value, f: &F) -> serde_json::Value
where
    F: Fn(&str) -> String,
{
    use serde_json::Value;

    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| map_value_strings(v, f)).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, map_value_strings(v, f)))
                .collect(),
        ),
        other => other,
    }
}
