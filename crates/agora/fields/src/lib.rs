//! Agora Fields - the dynamic field (EAV) layer
//!
//! Content instances carry typed attributes declared by their type's
//! field schema. At rest they are string rows; in memory they are
//! [`FieldValue`](agora_types::FieldValue)s held by a
//! [`DynamicAttributeSet`]. [`coercion`] maps between the two.

#![deny(unsafe_code)]

pub mod attributes;
pub mod coercion;
pub mod store;

pub use attributes::{AttributeDiff, DynamicAttributeSet};
pub use coercion::{default_for, infer_type, is_required, to_storage, to_typed};
pub use store::{load_attributes, save_attributes, AttributeStore, InMemoryAttributeStore};
