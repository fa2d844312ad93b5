//! Field coercion between typed values and their storage strings
//!
//! All functions here are pure. The key-based entry points infer the
//! semantic type from the field name; the `_as` variants take an explicit
//! type and are used when a field entry declares one.
//!
//! `to_typed(k, to_storage(k, v)) == v` holds for integer, boolean and
//! json values of the field's type (strings are passed through).

use agora_types::{name_implies_required, FieldValue, SemanticType};
use serde_json::Value;

/// Semantic type inferred from the field key.
pub fn infer_type(key: &str) -> SemanticType {
    SemanticType::infer(key)
}

/// Name-derived requiredness (`*_id`, `*_status`).
pub fn is_required(key: &str) -> bool {
    name_implies_required(key)
}

/// Default value for a semantic type.
pub fn default_for(ty: SemanticType) -> FieldValue {
    match ty {
        SemanticType::Integer => FieldValue::Integer(0),
        SemanticType::Boolean => FieldValue::Boolean(false),
        SemanticType::Float => FieldValue::Float(0.0),
        SemanticType::Json => FieldValue::Json(Value::Array(Vec::new())),
        SemanticType::String => FieldValue::String(String::new()),
    }
}

/// Decode a stored string for `key`.
pub fn to_typed(key: &str, raw: &str) -> FieldValue {
    to_typed_as(infer_type(key), raw)
}

/// Encode `value` for storage under `key`.
pub fn to_storage(key: &str, value: &FieldValue) -> String {
    to_storage_as(infer_type(key), value)
}

/// Decode a stored string as `ty`. Never fails; unparsable numbers decode
/// to zero.
pub fn to_typed_as(ty: SemanticType, raw: &str) -> FieldValue {
    match ty {
        SemanticType::Integer => FieldValue::Integer(parse_integer(raw)),
        SemanticType::Boolean => FieldValue::Boolean(is_truthy(raw)),
        SemanticType::Float => FieldValue::Float(raw.trim().parse().unwrap_or(0.0)),
        SemanticType::Json => FieldValue::Json(decode_json(raw)),
        SemanticType::String => FieldValue::String(raw.to_string()),
    }
}

/// Encode `value` as `ty`, converting it first when the variants differ.
pub fn to_storage_as(ty: SemanticType, value: &FieldValue) -> String {
    match coerce(ty, value) {
        FieldValue::Integer(v) => v.to_string(),
        FieldValue::Boolean(v) => String::from(if v { "1" } else { "0" }),
        FieldValue::Float(v) => v.to_string(),
        FieldValue::String(v) => v,
        FieldValue::Json(v) => v.to_string(),
    }
}

/// Convert any value into the variant for `ty`.
pub fn coerce(ty: SemanticType, value: &FieldValue) -> FieldValue {
    match ty {
        SemanticType::Integer => FieldValue::Integer(integer_of(value)),
        SemanticType::Boolean => FieldValue::Boolean(bool_of(value)),
        SemanticType::Float => FieldValue::Float(float_of(value)),
        SemanticType::Json => FieldValue::Json(json_of(value)),
        SemanticType::String => FieldValue::String(string_of(value)),
    }
}

/// Convert a schema-declared JSON default into a value of `ty`.
pub fn from_json_default(ty: SemanticType, default: &Value) -> FieldValue {
    coerce(ty, &FieldValue::Json(default.clone()))
}

/// Truthiness of a stored string. `""`, `"0"`, `"false"`, `"no"` and
/// `"off"` are false; anything else is true.
pub fn is_truthy(raw: &str) -> bool {
    let trimmed = raw.trim();
    !(trimmed.is_empty()
        || trimmed == "0"
        || ["false", "no", "off"]
            .iter()
            .any(|f| trimmed.eq_ignore_ascii_case(f)))
}

/// Decode a JSON document, falling back to a comma-joined list of strings.
pub fn decode_json(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Array(Vec::new());
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => Value::Array(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect(),
        ),
    }
}

/// Strict numeric parse used when a caller sets a value. Returns `None`
/// if `raw` is not a number of the requested type.
pub fn parse_strict(ty: SemanticType, raw: &str) -> Option<FieldValue> {
    let trimmed = raw.trim();
    match ty {
        SemanticType::Integer => trimmed
            .parse::<i64>()
            .ok()
            .or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0)
                    .and_then(float_to_integer)
            })
            .map(FieldValue::Integer),
        SemanticType::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(FieldValue::Float),
        _ => Some(to_typed_as(ty, raw)),
    }
}

/// Truncate a float to an integer. `None` if it is not finite or lies
/// outside the `i64` range.
pub fn float_to_integer(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_integer(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return v;
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return float_to_integer(f).unwrap_or(0);
    }
    // leading-integer prefix, e.g. "42 votes"
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().unwrap_or(0)
}

fn integer_of(value: &FieldValue) -> i64 {
    match value {
        FieldValue::Integer(v) => *v,
        FieldValue::Boolean(v) => i64::from(*v),
        FieldValue::Float(v) => float_to_integer(*v).unwrap_or(0),
        FieldValue::String(s) => parse_integer(s),
        FieldValue::Json(v) => match v {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(float_to_integer))
                .unwrap_or(0),
            Value::Bool(b) => i64::from(*b),
            Value::String(s) => parse_integer(s),
            _ => 0,
        },
    }
}

fn bool_of(value: &FieldValue) -> bool {
    match value {
        FieldValue::Integer(v) => *v != 0,
        FieldValue::Boolean(v) => *v,
        FieldValue::Float(v) => *v != 0.0,
        FieldValue::String(s) => is_truthy(s),
        FieldValue::Json(v) => match v {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => is_truthy(s),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        },
    }
}

fn float_of(value: &FieldValue) -> f64 {
    match value {
        FieldValue::Integer(v) => *v as f64,
        FieldValue::Boolean(v) => f64::from(u8::from(*v)),
        FieldValue::Float(v) => *v,
        FieldValue::String(s) => s.trim().parse().unwrap_or(0.0),
        FieldValue::Json(v) => match v {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::String(s) => s.trim().parse().unwrap_or(0.0),
            _ => 0.0,
        },
    }
}

fn json_of(value: &FieldValue) -> Value {
    match value {
        FieldValue::Integer(v) => Value::from(*v),
        FieldValue::Boolean(v) => Value::Bool(*v),
        FieldValue::Float(v) => Value::from(*v),
        FieldValue::String(s) => decode_json(s),
        FieldValue::Json(v) => v.clone(),
    }
}

fn string_of(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => s.clone(),
        FieldValue::Boolean(v) => String::from(if *v { "1" } else { "0" }),
        FieldValue::Json(Value::String(s)) => s.clone(),
        FieldValue::Json(Value::Null) => String::new(),
        other => other.to_string(),
    }
}
