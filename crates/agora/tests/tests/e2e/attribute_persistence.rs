//! E2E: attribute sets survive a save/load cycle through the store boundary.

use agora_catalog::{InMemoryTypeCatalog, TypeCatalog};
use agora_fields::{load_attributes, save_attributes, AttributeStore, InMemoryAttributeStore};
use agora_types::{FieldValue, InstanceId, TypeKind, TypeName};
use serde_json::json;
use std::collections::BTreeMap;

fn rows(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn save_then_load_preserves_typed_values() {
    crate::init_tracing();
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let schema = catalog
        .lookup(TypeKind::Inquiry, &TypeName::new("petition"))
        .unwrap();
    let store = InMemoryAttributeStore::new();
    let id = InstanceId::new("petition-7");

    let mut attrs = load_attributes(&store, schema.clone(), &id).unwrap();
    attrs
        .merge(&rows(&[
            ("resolver_id", "42"),
            ("signature_count", "1200"),
            ("is_binding", "true"),
            ("district_map", r#"["north","harbour"]"#),
            ("summary_text", "Extend the night bus network"),
        ]))
        .unwrap();
    save_attributes(&store, &attrs).unwrap();

    let persisted = store.load(&id).unwrap();
    assert_eq!(persisted.get("is_binding").map(String::as_str), Some("1"));

    let reloaded = load_attributes(&store, schema, &id).unwrap();
    assert_eq!(reloaded.values(), attrs.values());
    assert_eq!(reloaded.integer("signature_count"), Some(1200));
    assert_eq!(reloaded.json("district_map"), Some(&json!(["north", "harbour"])));
}

#[test]
fn failed_merge_leaves_store_and_set_untouched() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let schema = catalog
        .lookup(TypeKind::Inquiry, &TypeName::new("law_proposal"))
        .unwrap();
    let store = InMemoryAttributeStore::new();
    let id = InstanceId::new("law-3");

    let mut attrs = load_attributes(&store, schema, &id).unwrap();
    assert_eq!(attrs.text("legal_status"), Some("draft"));
    assert_eq!(attrs.boolean("is_binding"), Some(true));

    let err = attrs
        .merge(&rows(&[("law_number", "17"), ("legal_status", "vetoed")]))
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(attrs.integer("law_number"), Some(0));
    assert_eq!(store.instance_count().unwrap(), 0);
}

#[test]
fn orphan_rows_are_dropped_on_next_save() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let schema = catalog
        .lookup(TypeKind::Inquiry, &TypeName::new("statement"))
        .unwrap();
    let store = InMemoryAttributeStore::new();
    let id = InstanceId::new("statement-9");
    store
        .replace_all(&id, &rows(&[("body_text", "Agreed."), ("legacy_flag", "1")]))
        .unwrap();

    let attrs = load_attributes(&store, schema, &id).unwrap();
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs.get("body_text"), Some(&FieldValue::from("Agreed.")));

    let persisted = store.load(&id).unwrap();
    let diff = attrs.diff(&persisted);
    assert!(diff.removed.contains("legacy_flag"));

    save_attributes(&store, &attrs).unwrap();
    assert!(!store.load(&id).unwrap().contains_key("legacy_flag"));
}
