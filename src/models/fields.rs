// src/models/fields.rs
//! Template-defined custom fields.
//!
//! Certificate templates attach an open bag of extra fields to every
//! certificate. Values are restricted to a small closed set so that each one
//! has exactly one canonical encoding; anything else is rejected when the bag
//! is built, never stringified on a best-effort basis.

use crate::error::EncodingError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Sorted mapping of field name to value. `BTreeMap<String, _>` orders keys
/// by their UTF-8 bytes, which is also code point order.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A single custom field value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Map(FieldMap),
}

impl FieldValue {
    /// Converts an arbitrary JSON value into the closed value set.
    ///
    /// # Arguments
    /// * `path` - Dotted key path used in error messages (e.g. `customFields.grade`)
    /// * `value` - JSON value to convert
    ///
    /// # Errors
    /// - `EncodingError::UnsupportedValue` for `null`, arrays, and integers
    ///   outside the signed 64-bit range
    /// - `EncodingError::NonFiniteNumber` never occurs for parsed JSON but is
    ///   checked again at canonicalization time
    pub fn from_json(path: &str, value: &Value) -> Result<Self, EncodingError> {
        match value {
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Integer(i))
                } else if n.is_u64() {
                    Err(EncodingError::UnsupportedValue {
                        path: path.to_string(),
                        kind: "unsigned integer beyond i64",
                    })
                } else {
                    n.as_f64().map(FieldValue::Float).ok_or_else(|| {
                        EncodingError::NonFiniteNumber {
                            path: path.to_string(),
                        }
                    })
                }
            }
            Value::Object(map) => {
                let mut fields = FieldMap::new();
                for (key, nested) in map {
                    let nested_path = format!("{}.{}", path, key);
                    fields.insert(key.clone(), FieldValue::from_json(&nested_path, nested)?);
                }
                Ok(FieldValue::Map(fields))
            }
            Value::Null => Err(EncodingError::UnsupportedValue {
                path: path.to_string(),
                kind: "null",
            }),
            Value::Array(_) => Err(EncodingError::UnsupportedValue {
                path: path.to_string(),
                kind: "array",
            }),
        }
    }

    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Text(_) => "text",
            FieldValue::Map(_) => "map",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<FieldMap> for FieldValue {
    fn from(value: FieldMap) -> Self {
        FieldValue::Map(value)
    }
}

/// Builds a [`FieldMap`] from a JSON object of custom template fields.
///
/// # Errors
/// `EncodingError::NotAnObject` when `value` is not an object, or any error
/// from [`FieldValue::from_json`] for the nested values.
pub fn fields_from_json(value: &Value) -> Result<FieldMap, EncodingError> {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, v)| Ok((key.clone(), FieldValue::from_json(key, v)?)))
            .collect(),
        Value::Null => Ok(FieldMap::new()),
        other => Err(EncodingError::NotAnObject {
            kind: json_kind(other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
