//! Seed catalog configuration
//!
//! The initial set of types is configuration, not code. A seed is a TOML
//! document of catalog rows grouped by kind.

use agora_types::{AgoraError, AgoraResult, TypeKind, TypeRecord, TypeSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;

const BUILTIN_SEED: &str = include_str!("../seed/default_catalog.toml");

/// Catalog rows to load at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub inquiry_types: Vec<TypeRecord>,
    #[serde(default)]
    pub option_types: Vec<TypeRecord>,
    #[serde(default)]
    pub group_types: Vec<TypeRecord>,
}

impl CatalogSeed {
    /// The default catalog shipped with the crate.
    pub fn builtin() -> AgoraResult<Self> {
        Self::from_toml_str(BUILTIN_SEED)
    }

    pub fn from_toml_str(contents: &str) -> AgoraResult<Self> {
        toml::from_str(contents).map_err(|e| AgoraError::Config(e.to_string()))
    }

    /// Load a seed file.
    pub fn load(path: impl AsRef<Path>) -> AgoraResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AgoraError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Every row paired with the kind it belongs to.
    pub fn records(&self) -> impl Iterator<Item = (TypeKind, &TypeRecord)> {
        self.inquiry_types
            .iter()
            .map(|r| (TypeKind::Inquiry, r))
            .chain(self.option_types.iter().map(|r| (TypeKind::InquiryOption, r)))
            .chain(self.group_types.iter().map(|r| (TypeKind::Group, r)))
    }

    /// Parse every row; the first bad row fails the whole seed.
    pub fn schemas(&self) -> AgoraResult<Vec<TypeSchema>> {
        self.records()
            .map(|(kind, record)| TypeSchema::from_record(kind, record))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inquiry_types.len() + self.option_types.len() + self.group_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
