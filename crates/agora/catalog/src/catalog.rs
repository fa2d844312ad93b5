//! Type catalog lookup
//!
//! The catalog is owned by the persistence layer. The core only reads
//! from it, by kind and type name, and accepts any consistent snapshot.

use crate::seed::CatalogSeed;
use agora_types::{AgoraError, AgoraResult, TypeKind, TypeName, TypeSchema};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Read access to the catalog of type schemas.
pub trait TypeCatalog: Send + Sync {
    /// Schema for `type_name` within `kind`, or `NotFound`.
    fn lookup(&self, kind: TypeKind, type_name: &TypeName) -> AgoraResult<Arc<TypeSchema>>;

    fn contains(&self, kind: TypeKind, type_name: &TypeName) -> bool {
        self.lookup(kind, type_name).is_ok()
    }
}

/// In-memory catalog for development, tests and seeded deployments.
///
/// Writes replace whole schemas under a write lock, so readers always see
/// either the old or the new schema. Last writer wins.
#[derive(Debug, Default)]
pub struct InMemoryTypeCatalog {
    types: RwLock<HashMap<(TypeKind, TypeName), Arc<TypeSchema>>>,
}

impl InMemoryTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from seed rows. Nothing is inserted unless every
    /// row parses.
    pub fn from_seed(seed: &CatalogSeed) -> AgoraResult<Self> {
        let schemas = seed.schemas()?;
        let catalog = Self::new();
        for schema in schemas {
            catalog.insert(schema)?;
        }
        info!(types = seed.len(), "Type catalog seeded");
        Ok(catalog)
    }

    /// The catalog built from the shipped default seed.
    pub fn builtin() -> AgoraResult<Self> {
        Self::from_seed(&CatalogSeed::builtin()?)
    }

    /// Add or replace a schema after structural validation.
    pub fn insert(&self, schema: TypeSchema) -> AgoraResult<()> {
        schema.validate()?;
        let mut types = self.types.write().map_err(|_| lock_poisoned())?;
        types.insert((schema.kind, schema.type_name.clone()), Arc::new(schema));
        Ok(())
    }

    /// Type names of one kind, sorted.
    pub fn type_names(&self, kind: TypeKind) -> AgoraResult<Vec<TypeName>> {
        let types = self.types.read().map_err(|_| lock_poisoned())?;
        let mut names: Vec<TypeName> = types
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn len(&self) -> AgoraResult<usize> {
        let types = self.types.read().map_err(|_| lock_poisoned())?;
        Ok(types.len())
    }

    pub fn is_empty(&self) -> AgoraResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl TypeCatalog for InMemoryTypeCatalog {
    fn lookup(&self, kind: TypeKind, type_name: &TypeName) -> AgoraResult<Arc<TypeSchema>> {
        let types = self.types.read().map_err(|_| lock_poisoned())?;
        types
            .get(&(kind, type_name.clone()))
            .cloned()
            .ok_or_else(|| AgoraError::NotFound {
                kind,
                type_name: type_name.clone(),
            })
    }
}

fn lock_poisoned() -> AgoraError {
    AgoraError::Storage("type catalog lock poisoned".into())
}
