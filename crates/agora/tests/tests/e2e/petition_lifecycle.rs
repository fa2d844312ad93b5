//! E2E: a petition from creation to transformation, against the shipped catalog.

use agora_catalog::{InMemoryTypeCatalog, TypeCatalog, TypeGraph};
use agora_fields::DynamicAttributeSet;
use agora_types::{AgoraError, EdgeKind, FieldValue, InstanceId, TypeKind, TypeName};

fn petition_type() -> TypeName {
    TypeName::new("petition")
}

#[test]
fn petition_accepts_official_response_only() {
    crate::init_tracing();
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let graph = TypeGraph::new(&catalog);

    graph
        .create_root(TypeKind::Inquiry, &petition_type())
        .unwrap();

    let official = graph
        .attach(TypeKind::Inquiry, &petition_type(), &TypeName::new("official"))
        .unwrap();
    assert_eq!(official.type_name, TypeName::new("official"));

    let err = graph
        .attach(TypeKind::Inquiry, &petition_type(), &TypeName::new("proposal"))
        .unwrap_err();
    assert_eq!(
        err,
        AgoraError::TypeGraphViolation {
            edge: EdgeKind::Response,
            from: petition_type(),
            to: TypeName::new("proposal"),
        }
    );
}

#[test]
fn official_cannot_stand_alone() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let graph = TypeGraph::new(&catalog);
    let err = graph
        .create_root(TypeKind::Inquiry, &TypeName::new("official"))
        .unwrap_err();
    assert!(err.is_type_graph_violation());
}

#[test]
fn resolver_id_is_required_and_numeric() {
    crate::init_tracing();
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let schema = catalog.lookup(TypeKind::Inquiry, &petition_type()).unwrap();
    let mut attrs = DynamicAttributeSet::empty(InstanceId::new("petition-1"), schema);

    let err = attrs.set("resolver_id", "").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(attrs.integer("resolver_id"), Some(0));

    attrs.set("resolver_id", "42").unwrap();
    assert_eq!(attrs.get("resolver_id"), Some(&FieldValue::Integer(42)));

    assert!(attrs.set("resolver_id", "forty-two").unwrap_err().is_validation());
}

#[test]
fn petition_summary_respects_max_length() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let schema = catalog.lookup(TypeKind::Inquiry, &petition_type()).unwrap();
    let mut attrs = DynamicAttributeSet::empty(InstanceId::new("petition-2"), schema);

    attrs.set("summary_text", "x".repeat(2000)).unwrap();
    assert!(attrs.set("summary_text", "x".repeat(2001)).is_err());
    assert_eq!(attrs.text("summary_text").map(str::len), Some(2000));
}

#[test]
fn petition_transforms_into_proposal() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let graph = TypeGraph::new(&catalog);

    let proposal = graph
        .transform(TypeKind::Inquiry, &petition_type(), &TypeName::new("proposal"))
        .unwrap();
    assert!(proposal.has_field("budget"));

    // the reverse edge is not declared
    assert!(graph
        .transform(TypeKind::Inquiry, &TypeName::new("proposal"), &petition_type())
        .unwrap_err()
        .is_type_graph_violation());
}

#[test]
fn assembly_holds_petitions() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let graph = TypeGraph::new(&catalog);

    let held = graph
        .attach(
            TypeKind::Group,
            &TypeName::new("citizen_assembly"),
            &petition_type(),
        )
        .unwrap();
    assert_eq!(held.kind, TypeKind::Inquiry);

    assert!(graph
        .attach(
            TypeKind::Group,
            &TypeName::new("citizen_assembly"),
            &TypeName::new("statement"),
        )
        .is_err());
}
