//! Type graph validation
//!
//! Edges between types are derived from the source type's schema, never
//! stored separately:
//!
//! - `can_respond(parent, child)` iff `child` is in `parent.allowed_responses`
//! - `can_transform(from, to)` iff `to` is in `from.allowed_transformations`
//!
//! An undeclared list allows nothing. Edges are directed: a response edge
//! from A to B says nothing about B to A. The graph is checked one edge at a
//! time; self-edges and transformation cycles are permitted.
//!
//! Group types use the same predicate for the inquiry types they may hold.

use crate::catalog::TypeCatalog;
use agora_types::{AgoraError, AgoraResult, EdgeKind, TypeKind, TypeName, TypeSchema};
use std::sync::Arc;
use tracing::debug;

/// Edge gate over a type catalog.
pub struct TypeGraph<'a> {
    catalog: &'a dyn TypeCatalog,
}

impl<'a> TypeGraph<'a> {
    pub fn new(catalog: &'a dyn TypeCatalog) -> Self {
        Self { catalog }
    }

    pub fn can_respond(parent: &TypeSchema, child: &TypeName) -> bool {
        parent.allows_response(child)
    }

    pub fn can_transform(from: &TypeSchema, to: &TypeName) -> bool {
        from.allows_transformation(to)
    }

    /// The single gate before creating a child, response or group edge.
    pub fn validate_attach(parent: &TypeSchema, child: &TypeName) -> AgoraResult<()> {
        if Self::can_respond(parent, child) {
            return Ok(());
        }
        debug!(parent = %parent.type_name, child = %child, "Rejected response edge");
        Err(AgoraError::TypeGraphViolation {
            edge: EdgeKind::Response,
            from: parent.type_name.clone(),
            to: child.clone(),
        })
    }

    pub fn validate_transform(from: &TypeSchema, to: &TypeName) -> AgoraResult<()> {
        if Self::can_transform(from, to) {
            return Ok(());
        }
        debug!(from = %from.type_name, to = %to, "Rejected transformation edge");
        Err(AgoraError::TypeGraphViolation {
            edge: EdgeKind::Transformation,
            from: from.type_name.clone(),
            to: to.clone(),
        })
    }

    /// An instance without a parent requires a root type.
    pub fn validate_root(schema: &TypeSchema) -> AgoraResult<()> {
        if schema.is_root {
            return Ok(());
        }
        Err(AgoraError::TypeGraphViolation {
            edge: EdgeKind::Root,
            from: schema.type_name.clone(),
            to: schema.type_name.clone(),
        })
    }

    /// Declared response targets, sorted. Empty when undeclared.
    pub fn responses_of(schema: &TypeSchema) -> Vec<&TypeName> {
        schema
            .allowed_responses
            .iter()
            .flat_map(|set| set.iter())
            .collect()
    }

    /// Declared transformation targets, sorted. Empty when undeclared.
    pub fn transformations_of(schema: &TypeSchema) -> Vec<&TypeName> {
        schema
            .allowed_transformations
            .iter()
            .flat_map(|set| set.iter())
            .collect()
    }

    /// Check that `child_type` may attach under an instance of
    /// `parent_type`, and return the child's schema.
    ///
    /// The child is looked up in `parent_kind.child_kind()`; a declared but
    /// uncatalogued child is `NotFound`.
    pub fn attach(
        &self,
        parent_kind: TypeKind,
        parent_type: &TypeName,
        child_type: &TypeName,
    ) -> AgoraResult<Arc<TypeSchema>> {
        let parent = self.catalog.lookup(parent_kind, parent_type)?;
        Self::validate_attach(&parent, child_type)?;
        self.catalog.lookup(parent_kind.child_kind(), child_type)
    }

    /// Check that an instance of `from` may become `to`, and return the
    /// target schema.
    pub fn transform(
        &self,
        kind: TypeKind,
        from: &TypeName,
        to: &TypeName,
    ) -> AgoraResult<Arc<TypeSchema>> {
        let source = self.catalog.lookup(kind, from)?;
        Self::validate_transform(&source, to)?;
        self.catalog.lookup(kind, to)
    }

    /// Check that a parentless instance of `type_name` may exist, and
    /// return its schema.
    pub fn create_root(&self, kind: TypeKind, type_name: &TypeName) -> AgoraResult<Arc<TypeSchema>> {
        let schema = self.catalog.lookup(kind, type_name)?;
        Self::validate_root(&schema)?;
        Ok(schema)
    }
}
