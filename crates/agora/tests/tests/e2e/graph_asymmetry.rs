//! E2E: type-graph edges are directed and declared per source type.

use agora_catalog::{InMemoryTypeCatalog, TypeCatalog, TypeGraph};
use agora_types::{TypeKind, TypeName, TypeSchema};

fn lookup(catalog: &InMemoryTypeCatalog, name: &str) -> std::sync::Arc<TypeSchema> {
    catalog
        .lookup(TypeKind::Inquiry, &TypeName::new(name))
        .unwrap()
}

#[test]
fn law_proposal_and_amendment_are_asymmetric() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let law = lookup(&catalog, "law_proposal");
    let amendment = lookup(&catalog, "amendment");

    assert!(TypeGraph::can_respond(&law, &TypeName::new("amendment")));
    assert!(!TypeGraph::can_respond(&amendment, &TypeName::new("law_proposal")));

    // amendment declares no edges at all
    assert!(amendment.allowed_responses.is_none());
    assert!(TypeGraph::responses_of(&amendment).is_empty());
}

#[test]
fn every_declared_response_resolves_in_builtin_catalog() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let graph = TypeGraph::new(&catalog);

    for kind in [TypeKind::Inquiry, TypeKind::InquiryOption, TypeKind::Group] {
        for name in catalog.type_names(kind).unwrap() {
            let schema = catalog.lookup(kind, &name).unwrap();
            for child in TypeGraph::responses_of(&schema) {
                graph.attach(kind, &name, child).unwrap();
            }
            for target in TypeGraph::transformations_of(&schema) {
                graph.transform(kind, &name, target).unwrap();
            }
        }
    }
}

#[test]
fn known_gap_self_response_and_transform_cycles_are_permitted() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let graph = TypeGraph::new(&catalog);

    // debate may answer a debate
    graph
        .attach(TypeKind::Inquiry, &TypeName::new("debate"), &TypeName::new("debate"))
        .unwrap();

    // proposal -> law_proposal -> proposal
    graph
        .transform(
            TypeKind::Inquiry,
            &TypeName::new("proposal"),
            &TypeName::new("law_proposal"),
        )
        .unwrap();
    graph
        .transform(
            TypeKind::Inquiry,
            &TypeName::new("law_proposal"),
            &TypeName::new("proposal"),
        )
        .unwrap();
}

#[test]
fn explicit_empty_list_denies_everything() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let statement = lookup(&catalog, "statement");
    assert_eq!(statement.allowed_responses.as_ref().map(|s| s.len()), Some(0));
    assert!(TypeGraph::validate_attach(&statement, &TypeName::new("statement")).is_err());
}

#[test]
fn unknown_type_is_not_found() {
    let catalog = InMemoryTypeCatalog::builtin().unwrap();
    let graph = TypeGraph::new(&catalog);
    let err = graph
        .attach(
            TypeKind::Inquiry,
            &TypeName::new("referendum"),
            &TypeName::new("official"),
        )
        .unwrap_err();
    assert!(err.is_not_found());
}
