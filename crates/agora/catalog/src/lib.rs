//! Agora Catalog - type catalog and type graph
//!
//! Types are runtime data. This crate defines how the core reads them
//! ([`TypeCatalog`]), how an initial catalog is configured
//! ([`CatalogSeed`]), and which edges between types are legal
//! ([`TypeGraph`]).

#![deny(unsafe_code)]

pub mod catalog;
pub mod graph;
pub mod seed;

pub use catalog::{InMemoryTypeCatalog, TypeCatalog};
pub use graph::TypeGraph;
pub use seed::CatalogSeed;
