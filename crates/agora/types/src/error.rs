//! Error taxonomy for the Agora content model
//!
//! Every failure is returned as a value. Nothing in the core logs an
//! error and carries on, and nothing is retried.

use crate::access::{Permission, Role};
use crate::schema::{EdgeKind, TypeKind, TypeName};
use thiserror::Error;

/// Errors produced by the type system and its rule engines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AgoraError {
    /// Bad field value or bad rule parameters; the caller can correct the input.
    #[error("validation failed for `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// The requested edge is not declared by the source type.
    #[error("type graph violation: {edge} edge {from} -> {to} is not allowed")]
    TypeGraphViolation {
        edge: EdgeKind,
        from: TypeName,
        to: TypeName,
    },

    /// A permission check made through `require` was denied.
    #[error("forbidden: `{permission}` denied for role `{role}`")]
    Forbidden { permission: Permission, role: Role },

    /// Unknown type name in a catalog lookup.
    #[error("{kind} type not found: {type_name}")]
    NotFound { kind: TypeKind, type_name: TypeName },

    /// A catalog row whose field or edge JSON cannot be parsed.
    #[error("invalid schema for type {type_name}: {reason}")]
    InvalidSchema { type_name: TypeName, reason: String },

    /// The attribute store collaborator failed.
    #[error("attribute store error: {0}")]
    Storage(String),

    /// Seed configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl AgoraError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_schema(type_name: &TypeName, reason: impl Into<String>) -> Self {
        Self::InvalidSchema {
            type_name: type_name.clone(),
            reason: reason.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_type_graph_violation(&self) -> bool {
        matches!(self, Self::TypeGraphViolation { .. })
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for Agora operations
pub type AgoraResult<T> = Result<T, AgoraError>;
