//! Shared coercion of loosely shaped tool arguments into one flat mapping.
//!
//! Upstream stages may hand over a proper object, a JSON string, a list of
//! partial objects, or values wrapped as `{"description": ...}` records. Every
//! tool receives the same [`ToolInput`] regardless of which shape arrived.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{EntityBag, UNKNOWN_VALUE};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolInput {
    values: Vec<(String, String)>,
}

impl ToolInput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bag(bag: &EntityBag) -> Self {
        let mut input = Self::default();
        for (label, value) in bag.iter() {
            if let Some(text) = flatten_value(value) {
                input.set(label, text);
            }
        }
        input
    }

    /// Accepts an object, a JSON-encoded object or list of objects, or a list
    /// of objects merged left to right. Any other shape yields an empty input.
    pub fn coerce(raw: &Value) -> Self {
        match raw {
            Value::Object(map) => Self::from_map(map),
            Value::Array(items) => Self::from_list(items),
            Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Object(map)) => Self::from_map(&map),
                Ok(Value::Array(items)) => Self::from_list(&items),
                _ => Self::default(),
            },
            _ => Self::default(),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let mut input = Self::default();
        for (key, value) in map {
            if let Some(text) = flatten_value(value) {
                input.set(key, text);
            }
        }
        input
    }

    fn from_list(items: &[Value]) -> Self {
        let mut input = Self::default();
        for map in items.iter().filter_map(Value::as_object) {
            for (key, value) in map {
                if let Some(text) = flatten_value(value) {
                    input.set(key, text);
                }
            }
        }
        input
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.values.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((key, value)),
        }
    }

    /// Returns the value for `key`, treating blanks and the `Unknown` sentinel as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty() && *value != UNKNOWN_VALUE)
    }

    /// Raw value including sentinels, for diagnostics.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

/// Reduces an entity value to text. Records carrying a `description` field
/// are replaced by that field.
pub fn flatten_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Object(map) => match map.get("description") {
            Some(description) => flatten_value(description),
            None => Some(value.to_string()),
        },
        Value::Array(items) => {
            let parts = items.iter().filter_map(flatten_value).collect::<Vec<_>>();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
    }
}
