//! Typed attribute values
//!
//! At rest every dynamic attribute is a string. In memory it is one of
//! these variants, chosen by the field's semantic type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A strongly-typed dynamic attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Boolean(bool),
    Float(f64),
    String(String),
    Json(serde_json::Value),
}

impl FieldValue {
    /// Nil-or-empty test used by the required-field rule.
    ///
    /// Blank strings, JSON null and empty JSON collections are empty.
    /// Numbers and booleans never are, including `0` and `false`.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::String(s) => s.trim().is_empty(),
            FieldValue::Json(serde_json::Value::Null) => true,
            FieldValue::Json(serde_json::Value::String(s)) => s.trim().is_empty(),
            FieldValue::Json(serde_json::Value::Array(a)) => a.is_empty(),
            FieldValue::Json(serde_json::Value::Object(o)) => o.is_empty(),
            _ => false,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            FieldValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Boolean(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::String(v) => f.write_str(v),
            FieldValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Integer(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Boolean(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        FieldValue::Json(v)
    }
}
