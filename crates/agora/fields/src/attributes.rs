//! Dynamic attribute sets
//!
//! A `DynamicAttributeSet` is the typed, in-memory view of one instance's
//! EAV rows. Its key set is always exactly the field keys of the owning
//! type: persisted keys the schema does not declare are dropped on build,
//! and missing keys resolve to defaults.

use crate::coercion;
use agora_types::{
    AgoraError, AgoraResult, FieldSpec, FieldValue, InstanceId, SemanticType, TypeName, TypeSchema,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Typed attribute bag of one inquiry or option.
#[derive(Clone, Debug)]
pub struct DynamicAttributeSet {
    instance_id: InstanceId,
    schema: Arc<TypeSchema>,
    values: BTreeMap<String, FieldValue>,
}

/// Difference between an attribute set and a persisted row set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDiff {
    /// Keys present in the set but not persisted, with their storage values
    pub added: BTreeMap<String, String>,
    /// Keys whose storage value differs, with the new value
    pub changed: BTreeMap<String, String>,
    /// Persisted keys the schema does not declare
    pub removed: BTreeSet<String>,
}

impl AttributeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

impl DynamicAttributeSet {
    /// Build the set for `schema` from persisted key/value rows.
    ///
    /// Each declared field takes the persisted value if present, else the
    /// schema's declared default, else the default for its semantic type.
    pub fn build(
        instance_id: InstanceId,
        schema: impl Into<Arc<TypeSchema>>,
        persisted: &BTreeMap<String, String>,
    ) -> Self {
        let schema = schema.into();
        let values = schema
            .fields
            .iter()
            .map(|spec| {
                let ty = spec.semantic_type();
                let value = match persisted.get(&spec.key) {
                    Some(raw) => coercion::to_typed_as(ty, raw),
                    None => default_value(spec),
                };
                (spec.key.clone(), value)
            })
            .collect();

        trace!(
            instance = %instance_id,
            type_name = %schema.type_name,
            persisted = persisted.len(),
            "Built attribute set"
        );

        Self {
            instance_id,
            schema,
            values,
        }
    }

    /// A set holding only defaults.
    pub fn empty(instance_id: InstanceId, schema: impl Into<Arc<TypeSchema>>) -> Self {
        Self::build(instance_id, schema, &BTreeMap::new())
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn type_name(&self) -> &TypeName {
        &self.schema.type_name
    }

    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(FieldValue::as_integer)
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(FieldValue::as_bool)
    }

    pub fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(FieldValue::as_float)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    pub fn json(&self, key: &str) -> Option<&serde_json::Value> {
        self.get(key).and_then(FieldValue::as_json)
    }

    /// Validate and store one value. An empty value on an optional field
    /// stores the field's default.
    ///
    /// Fails with a validation error if the key is not declared, if a
    /// required field receives an empty value, or if the value breaks the
    /// field's numeric, allowed-values or length rules.
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) -> AgoraResult<()> {
        let typed = self.prepare(key, &value.into())?;
        debug!(instance = %self.instance_id, key = key, value = %typed, "Attribute set");
        self.values.insert(key.to_string(), typed);
        Ok(())
    }

    /// `set` for a raw storage string.
    pub fn set_raw(&mut self, key: &str, raw: &str) -> AgoraResult<()> {
        self.set(key, FieldValue::String(raw.to_string()))
    }

    /// Put a field back to its default.
    pub fn reset(&mut self, key: &str) -> AgoraResult<()> {
        let value = default_value(self.spec(key)?);
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Apply a batch of raw updates. Every update is validated before any
    /// is applied; one failure leaves the set untouched.
    pub fn merge(&mut self, updates: &BTreeMap<String, String>) -> AgoraResult<()> {
        let prepared = updates
            .iter()
            .map(|(key, raw)| {
                self.prepare(key, &FieldValue::String(raw.clone()))
                    .map(|value| (key.clone(), value))
            })
            .collect::<AgoraResult<Vec<_>>>()?;

        debug!(
            instance = %self.instance_id,
            updates = prepared.len(),
            "Merged attribute updates"
        );
        self.values.extend(prepared);
        Ok(())
    }

    /// Every attribute in storage form, for a full replace by the store.
    pub fn for_storage(&self) -> BTreeMap<String, String> {
        self.schema
            .fields
            .iter()
            .filter_map(|spec| {
                self.values.get(&spec.key).map(|value| {
                    (
                        spec.key.clone(),
                        coercion::to_storage_as(spec.semantic_type(), value),
                    )
                })
            })
            .collect()
    }

    /// Compare against the persisted rows.
    pub fn diff(&self, persisted: &BTreeMap<String, String>) -> AttributeDiff {
        let mut diff = AttributeDiff::default();
        for (key, value) in self.for_storage() {
            match persisted.get(&key) {
                None => {
                    diff.added.insert(key, value);
                }
                Some(old) if *old != value => {
                    diff.changed.insert(key, value);
                }
                Some(_) => {}
            }
        }
        diff.removed = persisted
            .keys()
            .filter(|key| !self.schema.has_field(key))
            .cloned()
            .collect();
        diff
    }

    fn spec(&self, key: &str) -> AgoraResult<&FieldSpec> {
        self.schema.field(key).ok_or_else(|| {
            AgoraError::validation(
                key,
                format!("not a field of type {}", self.schema.type_name),
            )
        })
    }

    fn prepare(&self, key: &str, value: &FieldValue) -> AgoraResult<FieldValue> {
        let spec = self.spec(key)?;
        let ty = spec.semantic_type();

        if value.is_blank() {
            if spec.is_required() {
                return Err(AgoraError::validation(key, "required field must not be empty"));
            }
            return Ok(default_value(spec));
        }

        if let FieldValue::String(raw) = value {
            if matches!(ty, SemanticType::Integer | SemanticType::Float)
                && coercion::parse_strict(ty, raw).is_none()
            {
                return Err(AgoraError::validation(
                    key,
                    format!("`{}` is not a valid {}", raw, ty),
                ));
            }
        }

        if ty == SemanticType::Integer && !fits_integer(value) {
            return Err(AgoraError::validation(
                key,
                format!("`{}` is out of range for an integer", value),
            ));
        }

        let stored = coercion::to_storage_as(ty, value);
        let typed = coercion::to_typed_as(ty, &stored);

        // "," or "{}" decode to an empty document
        if typed.is_blank() && spec.is_required() {
            return Err(AgoraError::validation(key, "required field must not be empty"));
        }

        if let Some(allowed) = &spec.allowed_values {
            let candidates = match &typed {
                FieldValue::Json(serde_json::Value::Array(items)) => items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                _ => vec![stored.clone()],
            };
            if let Some(bad) = candidates.iter().find(|c| !allowed.contains(c)) {
                return Err(AgoraError::validation(
                    key,
                    format!("`{}` is not one of {:?}", bad, allowed),
                ));
            }
        }

        if let (Some(max), SemanticType::String) = (spec.max_length(), ty) {
            let len = stored.chars().count();
            if len > max {
                return Err(AgoraError::validation(
                    key,
                    format!("length {} exceeds maximum of {}", len, max),
                ));
            }
        }

        Ok(typed)
    }
}

/// Whether a numeric value converts to `i64` without saturating. String
/// input is checked by the strict parse instead.
fn fits_integer(value: &FieldValue) -> bool {
    match value {
        FieldValue::Float(f) => coercion::float_to_integer(*f).is_some(),
        FieldValue::Json(serde_json::Value::Number(n)) => {
            n.is_i64() || n.as_f64().and_then(coercion::float_to_integer).is_some()
        }
        _ => true,
    }
}

fn default_value(spec: &FieldSpec) -> FieldValue {
    let ty = spec.semantic_type();
    match &spec.default {
        Some(default) => coercion::from_json_default(ty, default),
        None => coercion::default_for(ty),
    }
}
