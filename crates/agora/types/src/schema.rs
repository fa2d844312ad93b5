//! Type schemas: runtime descriptions of content types
//!
//! A type is a catalog row, not a compiled type. The row declares the
//! dynamic fields an instance carries, which types may attach beneath it,
//! and which types an instance may be converted into. Type names are an
//! open set; nothing here enumerates them.

use crate::error::{AgoraError, AgoraResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Which catalog a type lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Top-level deliberation item
    Inquiry,
    /// Nested response unit of an inquiry
    #[serde(rename = "option")]
    InquiryOption,
    /// Grouping of inquiries
    Group,
}

impl TypeKind {
    /// Kind of the types named by this kind's edges.
    ///
    /// Group types list the inquiry types they may hold; inquiry and option
    /// types list types of their own kind.
    pub fn child_kind(self) -> TypeKind {
        match self {
            TypeKind::Inquiry | TypeKind::Group => TypeKind::Inquiry,
            TypeKind::InquiryOption => TypeKind::InquiryOption,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Inquiry => "inquiry",
            TypeKind::InquiryOption => "option",
            TypeKind::Group => "group",
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a type, unique within its [`TypeKind`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(pub String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Kind of graph edge between two types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Child or reply attached beneath a parent
    Response,
    /// Conversion of an instance into another type
    Transformation,
    /// Existence without any parent
    Root,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeKind::Response => "response",
            EdgeKind::Transformation => "transformation",
            EdgeKind::Root => "root",
        })
    }
}

/// Semantic type of a dynamic field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    #[serde(alias = "int")]
    Integer,
    #[serde(alias = "bool")]
    Boolean,
    #[serde(alias = "double")]
    Float,
    #[serde(alias = "array")]
    Json,
    #[serde(alias = "text")]
    String,
}

impl SemanticType {
    /// Infer a semantic type from a field key by naming convention.
    ///
    /// Patterns are tried in order and the first match wins, so
    /// `status_map` is json while `is_status` is boolean only because no
    /// suffix rule matched first.
    pub fn infer(key: &str) -> SemanticType {
        const RULES: &[(&[&str], SemanticType)] = &[
            (&["_id", "_count", "_number"], SemanticType::Integer),
            (&["_ref"], SemanticType::String),
            (&["_map"], SemanticType::Json),
            (&["_text"], SemanticType::String),
            (&["_status"], SemanticType::String),
            (&["_date"], SemanticType::String),
            (&["_at"], SemanticType::Integer),
        ];

        for (suffixes, ty) in RULES {
            if suffixes.iter().any(|s| key.ends_with(s)) {
                return *ty;
            }
        }

        if ["is_", "has_", "can_"].iter().any(|p| key.starts_with(p)) {
            return SemanticType::Boolean;
        }

        SemanticType::String
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::Integer => "integer",
            SemanticType::Boolean => "boolean",
            SemanticType::Float => "float",
            SemanticType::Json => "json",
            SemanticType::String => "string",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name-derived requiredness: keys ending in `_id` or `_status`.
///
/// Independent of a field's declared `required` flag; callers honor both.
pub fn name_implies_required(key: &str) -> bool {
    key.ends_with("_id") || key.ends_with("_status")
}

/// Extra validation rules attached to a field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRules {
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

/// One entry of a type's field schema.
///
/// Deserializes from the catalog's field JSON:
/// `{key, label?, type?, required?, default?, allowed_values?, rules?: {maxLength?}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub key: String,
    /// Already-resolved display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Explicit type; overrides name-derived inference
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<SemanticType>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    #[serde(default)]
    pub rules: FieldRules,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            declared_type: None,
            required: false,
            default: None,
            allowed_values: None,
            rules: FieldRules::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_type(mut self, ty: SemanticType) -> Self {
        self.declared_type = Some(ty);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: serde_json::Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_max_length(mut self, max: usize) -> Self {
        self.rules.max_length = Some(max);
        self
    }

    /// Declared type if present, else the type inferred from the key.
    pub fn semantic_type(&self) -> SemanticType {
        self.declared_type
            .unwrap_or_else(|| SemanticType::infer(&self.key))
    }

    /// Required by declaration or by name; the stricter wins.
    pub fn is_required(&self) -> bool {
        self.required || name_implies_required(&self.key)
    }

    pub fn max_length(&self) -> Option<usize> {
        self.rules.max_length
    }
}

/// Immutable description of one content type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub kind: TypeKind,
    pub type_name: TypeName,
    /// Coarse grouping tag; not enforced structurally
    #[serde(default)]
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// `None` = not declared, `Some(empty)` = explicitly no children
    #[serde(default)]
    pub allowed_responses: Option<BTreeSet<TypeName>>,
    #[serde(default)]
    pub allowed_transformations: Option<BTreeSet<TypeName>>,
    #[serde(default)]
    pub is_root: bool,
}

impl TypeSchema {
    pub fn new(kind: TypeKind, type_name: impl Into<TypeName>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            family: String::new(),
            label: None,
            fields: Vec::new(),
            allowed_responses: None,
            allowed_transformations: None,
            is_root: false,
        }
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = family.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_allowed_responses<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TypeName>,
    {
        self.allowed_responses = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_allowed_transformations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TypeName>,
    {
        self.allowed_transformations = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn root(mut self) -> Self {
        self.is_root = true;
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    /// Field keys in declaration order
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    /// Whether `child` is a declared response type. Undeclared means no.
    pub fn allows_response(&self, child: &TypeName) -> bool {
        self.allowed_responses
            .as_ref()
            .is_some_and(|set| set.contains(child))
    }

    /// Whether instances may be converted into `target`. Undeclared means no.
    pub fn allows_transformation(&self, target: &TypeName) -> bool {
        self.allowed_transformations
            .as_ref()
            .is_some_and(|set| set.contains(target))
    }

    /// Structural checks: non-empty name, non-empty and unique field keys.
    pub fn validate(&self) -> AgoraResult<()> {
        if self.type_name.as_str().trim().is_empty() {
            return Err(AgoraError::invalid_schema(
                &self.type_name,
                "type name must not be empty",
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.key.trim().is_empty() {
                return Err(AgoraError::invalid_schema(
                    &self.type_name,
                    "field key must not be empty",
                ));
            }
            if !seen.insert(field.key.as_str()) {
                return Err(AgoraError::invalid_schema(
                    &self.type_name,
                    format!("duplicate field key `{}`", field.key),
                ));
            }
        }
        Ok(())
    }

    /// Parse a persisted catalog row into a schema.
    pub fn from_record(kind: TypeKind, record: &TypeRecord) -> AgoraResult<Self> {
        let type_name = TypeName::new(record.type_name.clone());

        let fields: Vec<FieldSpec> = match non_blank(record.fields.as_deref()) {
            Some(json) => serde_json::from_str(json).map_err(|e| {
                AgoraError::invalid_schema(&type_name, format!("field schema: {}", e))
            })?,
            None => Vec::new(),
        };

        let schema = Self {
            kind,
            family: record.family.clone(),
            label: record.label.clone(),
            fields,
            allowed_responses: parse_edges(&type_name, record.allowed_response.as_deref())?,
            allowed_transformations: parse_edges(
                &type_name,
                record.allowed_transformation.as_deref(),
            )?,
            is_root: record.is_root,
            type_name,
        };
        schema.validate()?;
        Ok(schema)
    }
}

/// A catalog row as the persistence layer stores it: scalar columns plus
/// JSON-encoded field and edge lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub type_name: String,
    #[serde(default)]
    pub family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub is_root: bool,
    /// JSON array of field entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    /// JSON array of type names, or null
    #[serde(
        default,
        alias = "allowed_inquiry_types",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed_response: Option<String>,
    /// JSON array of type names, or null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_transformation: Option<String>,
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_edges(type_name: &TypeName, raw: Option<&str>) -> AgoraResult<Option<BTreeSet<TypeName>>> {
    let Some(json) = non_blank(raw) else {
        return Ok(None);
    };
    let names: Option<Vec<String>> = serde_json::from_str(json)
        .map_err(|e| AgoraError::invalid_schema(type_name, format!("edge list: {}", e)))?;
    Ok(names.map(|names| names.into_iter().map(TypeName::new).collect()))
}
