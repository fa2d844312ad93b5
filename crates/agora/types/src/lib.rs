//! Agora Types - the shared vocabulary of the content model
//!
//! Content ("inquiries" and their nested "options") belongs to a named
//! type whose schema is itself data. This crate defines the shape of that
//! data: type schemas and their field entries, typed attribute values,
//! the access vocabulary used by the permission engine, and the error
//! taxonomy every Agora crate returns.

#![deny(unsafe_code)]

pub mod access;
pub mod error;
pub mod ids;
pub mod schema;
pub mod value;

pub use access::{AccessMode, Permission, Role, ShareType, ShowResults};
pub use error::{AgoraError, AgoraResult};
pub use ids::{GroupId, InstanceId, UserId};
pub use schema::{
    name_implies_required, EdgeKind, FieldRules, FieldSpec, SemanticType, TypeKind, TypeName,
    TypeRecord, TypeSchema,
};
pub use value::FieldValue;
