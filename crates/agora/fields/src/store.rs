//! Attribute store boundary
//!
//! The persistence layer keeps dynamic attributes as `(instance, key,
//! string value)` rows. The core only needs two operations from it: load
//! every row of an instance, and replace every row of an instance. A
//! replace must be atomic with respect to concurrent readers; a reader may
//! never observe an instance with its old rows deleted and the new ones not
//! yet written.

use crate::attributes::DynamicAttributeSet;
use agora_types::{AgoraError, AgoraResult, InstanceId, TypeSchema};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Key/value persistence for dynamic attributes.
pub trait AttributeStore: Send + Sync {
    /// All persisted rows of an instance; empty if none.
    fn load(&self, instance: &InstanceId) -> AgoraResult<BTreeMap<String, String>>;

    /// Delete every row of `instance`, then insert `values`, as one unit.
    fn replace_all(
        &self,
        instance: &InstanceId,
        values: &BTreeMap<String, String>,
    ) -> AgoraResult<()>;
}

/// Load an instance's rows and build its attribute set.
pub fn load_attributes<S: AttributeStore + ?Sized>(
    store: &S,
    schema: impl Into<Arc<TypeSchema>>,
    instance: &InstanceId,
) -> AgoraResult<DynamicAttributeSet> {
    let persisted = store.load(instance)?;
    Ok(DynamicAttributeSet::build(instance.clone(), schema, &persisted))
}

/// Flush an attribute set as a full replace.
pub fn save_attributes<S: AttributeStore + ?Sized>(
    store: &S,
    attributes: &DynamicAttributeSet,
) -> AgoraResult<()> {
    let rows = attributes.for_storage();
    debug!(
        instance = %attributes.instance_id(),
        rows = rows.len(),
        "Replacing attribute rows"
    );
    store.replace_all(attributes.instance_id(), &rows)
}

/// In-memory attribute store for development and testing.
///
/// `replace_all` swaps an instance's rows under a single write lock.
#[derive(Debug, Default)]
pub struct InMemoryAttributeStore {
    rows: RwLock<HashMap<InstanceId, BTreeMap<String, String>>>,
}

impl InMemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instances with stored rows
    pub fn instance_count(&self) -> AgoraResult<usize> {
        let rows = self.rows.read().map_err(|_| lock_poisoned())?;
        Ok(rows.len())
    }

    /// Drop every row of an instance.
    pub fn remove(&self, instance: &InstanceId) -> AgoraResult<()> {
        let mut rows = self.rows.write().map_err(|_| lock_poisoned())?;
        rows.remove(instance);
        Ok(())
    }
}

impl AttributeStore for InMemoryAttributeStore {
    fn load(&self, instance: &InstanceId) -> AgoraResult<BTreeMap<String, String>> {
        let rows = self.rows.read().map_err(|_| lock_poisoned())?;
        Ok(rows.get(instance).cloned().unwrap_or_default())
    }

    fn replace_all(
        &self,
        instance: &InstanceId,
        values: &BTreeMap<String, String>,
    ) -> AgoraResult<()> {
        let mut rows = self.rows.write().map_err(|_| lock_poisoned())?;
        rows.insert(instance.clone(), values.clone());
        Ok(())
    }
}

fn lock_poisoned() -> AgoraError {
    AgoraError::Storage("attribute store lock poisoned".into())
}
