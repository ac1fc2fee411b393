//! Golden Tests for Schema and Evolution Graphs
//!
//! Runs the full pipeline over the fixtures and checks the emitted graphs.

use std::collections::HashSet;

use sceviz::graph::{DiagnosticCode, Severity, KEYWORD_NODE_TYPE};
use sceviz::{parse_evolution, parse_schema, Element, SchemaGraph};
use serde_json::{json, Value};

fn fixture(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

fn person() -> SchemaGraph {
    parse_schema(&fixture(include_str!("fixtures/person.json"))).unwrap()
}

fn palette() -> SchemaGraph {
    parse_schema(&fixture(include_str!("fixtures/palette.json"))).unwrap()
}

fn references() -> SchemaGraph {
    parse_schema(&fixture(include_str!("fixtures/references.json"))).unwrap()
}

/// Unique ids, every edge target emitted, every source `#` or emitted
fn assert_well_formed(graph: &SchemaGraph) {
    let ids: HashSet<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids.len(), graph.node_count(), "duplicate node ids");
    assert!(ids.contains("#"));

    for edge in graph.edges() {
        assert!(ids.contains(edge.target.as_str()), "dangling target {}", edge.target);
        assert!(
            edge.source == "#" || ids.contains(edge.source.as_str()),
            "dangling source {}",
            edge.source
        );
        assert_eq!(edge.id, format!("{}->{}", edge.source, edge.target));
    }
}

// =============================================================================
// Schema Graph Tests
// =============================================================================

#[test]
fn test_fixtures_are_well_formed() {
    for graph in [person(), palette(), references()] {
        assert_well_formed(&graph);
        assert_eq!(graph.edge_count(), graph.node_count() - 1);
    }
}

#[test]
fn test_person_root() {
    let graph = person();
    let root = graph.root();

    assert_eq!(root.id, "#");
    assert_eq!(root.label, "Person");
    assert_eq!(root.node_type.as_deref(), Some("object"));
    assert_eq!(root.description.as_deref(), Some("A person record"));
    assert!(graph.node("#/title").is_none());
    assert!(graph.node("#/description").is_none());
    assert!(graph.node("#/type").is_none());
}

#[test]
fn test_person_nodes() {
    let graph = person();
    assert_eq!(graph.node_count(), 17);

    let name = graph.node("#/properties/name").unwrap();
    assert_eq!(name.label, "Full name");
    assert_eq!(name.node_type.as_deref(), Some("string"));

    let tags = graph.node("#/properties/tags").unwrap();
    assert_eq!(tags.node_type.as_deref(), Some("array"));
    assert_eq!(
        graph.node("#/properties/tags/items").unwrap().node_type.as_deref(),
        Some("string")
    );

    let city = graph.node("#/definitions/address/properties/city").unwrap();
    assert_eq!(city.label, "city");
    assert_eq!(city.node_type.as_deref(), Some("string"));

    assert_eq!(
        graph.node("#/required").unwrap().content,
        Some(json!(["name", "age"]))
    );
    assert_eq!(
        graph.node("#/properties/age/minimum").unwrap().content,
        Some(json!(0))
    );
    assert_eq!(
        graph.node("#/properties").unwrap().node_type.as_deref(),
        Some(KEYWORD_NODE_TYPE)
    );
}

#[test]
fn test_person_local_reference() {
    let graph = person();

    let address = graph.node("#/properties/address").unwrap();
    assert_eq!(address.content, None);
    assert!(graph.node("#/properties/address/$ref").is_none());
    assert!(graph
        .edges()
        .iter()
        .any(|e| e.source == "#/properties" && e.target == "#/properties/address"));
}

#[test]
fn test_type_keys_never_become_nodes() {
    let graph = person();
    assert!(graph.nodes().iter().all(|n| !n.id.ends_with("/type")));
}

#[test]
fn test_array_order_survives_byte_ordering() {
    let graph = palette();

    let expected: Vec<String> = (0..12).map(|i| format!("c{}", i)).collect();
    assert_eq!(
        graph.node("#/properties/color/enum").unwrap().content,
        Some(json!(expected))
    );
    assert_eq!(
        graph.node("#/examples").unwrap().content,
        Some(json!([[1, 2], [3, 4, 5]]))
    );
}

#[test]
fn test_array_of_objects() {
    let graph = palette();

    for (index, title) in ["first", "second", "third"].iter().enumerate() {
        let id = format!("#/items/{}/title", index);
        let node = graph.node(&id).unwrap();
        assert_eq!(node.content, Some(json!(title)));

        let edge = graph.edges().iter().find(|e| e.target == id).unwrap();
        assert_eq!(edge.source, "#/items");
    }
    assert!(graph.node("#/items/0").is_none());
}

#[test]
fn test_references_and_pointers() {
    let graph = references();
    assert_eq!(graph.root().label, "Order");

    assert_eq!(
        graph.node("#/properties/customer").unwrap().content,
        Some(json!("customer.json"))
    );
    assert_eq!(graph.node("#/properties/shipping").unwrap().content, None);
    assert_eq!(graph.node("#/properties/status/default").unwrap().content, None);
    assert_eq!(
        graph.node("#/properties/status/enum").unwrap().content,
        Some(json!([null, "placed", null]))
    );
    assert_eq!(
        graph.node("#/anyOf").unwrap().content,
        Some(json!(["a.json", "b.json"]))
    );

    // No pointer string survives anywhere in the output
    let serialized = serde_json::to_string(&graph.to_value().unwrap()).unwrap();
    assert!(!serialized.contains("\"content\":\"#"));
    assert!(graph.nodes().iter().all(|n| !n.id.ends_with("$ref")));
}

#[test]
fn test_dropped_references_are_reported() {
    let graph = references();
    let diags = graph.diagnostics();

    assert_eq!(diags.len(), 2);
    assert_eq!(diags.warning_count(), 0);
    for item in diags {
        assert_eq!(item.code, DiagnosticCode::DroppedReference);
        assert_eq!(item.severity(), Severity::Info);
    }
    assert_eq!(diags.all()[0].path, "#/anyOf/0/$ref");
    assert!(person().diagnostics().is_empty());
}

#[test]
fn test_empty_key_keeps_its_subtree() {
    let graph = parse_schema(&json!({"": {"a": 1}, "a": 2})).unwrap();

    let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["#", "#/a", "#/~e", "#/~e/a"]);
    assert_eq!(graph.node("#/~e/a").unwrap().content, Some(json!(1)));
    assert_well_formed(&graph);
}

#[test]
fn test_properties_named_type_survive() {
    let graph = parse_schema(&json!({"properties": {"type": {}, "name": {}}})).unwrap();

    assert!(graph.node("#/properties/type").is_some());
    assert!(graph.node("#/properties/name").is_some());
    assert_well_formed(&graph);
}

#[test]
fn test_element_shape() {
    let graph = person();
    let elements = graph.elements();
    assert_eq!(elements.len(), graph.node_count() + graph.edge_count());

    let value = graph.to_value().unwrap();
    assert_eq!(value[0]["data"]["id"], "#");
    assert_eq!(value[0]["data"]["label"], "Person");
    assert_eq!(value[0]["grabbable"], false);
    assert!(value[2]["data"]["source"].is_string());
    assert!(value[2]["data"].get("label").is_none());

    // Elements read back into the same shape
    let parsed: Vec<Element> = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, elements);
}

#[test]
fn test_dot_export() {
    let dot = palette().to_dot();
    assert!(dot.starts_with("digraph SchemaGraph {"));
    assert!(dot.trim_end().ends_with('}'));
    assert!(dot.contains("Palette"));
}

// =============================================================================
// Evolution Graph Tests
// =============================================================================

#[test]
fn test_evolution_fixture() {
    let graph = parse_evolution(fixture(include_str!("fixtures/evolution.json"))).unwrap();

    let labels: Vec<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["v0", "v1", "v2"]);
    assert_eq!(graph.edges.len(), 4);

    let ops: Vec<&str> = graph.edges.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(ops, vec!["green", "red", "blue", "orange"]);

    assert_eq!(graph.edges[1].subject.as_deref(), Some("#/legacy/properties/id"));
    assert_eq!(graph.edges[2].source, "person-v2.json");
    assert_eq!(graph.edges[2].target, "person-v3.json");
    assert_eq!(graph.edges[3].subject, None);
}

#[test]
fn test_evolution_subjects_resolve_in_schema_graph() {
    let schema = person();
    let evolution = parse_evolution(fixture(include_str!("fixtures/evolution.json"))).unwrap();

    let resolved: Vec<Option<&str>> = evolution
        .subjects_in(&schema)
        .into_iter()
        .map(|(_, node)| node.map(|n| n.id.as_str()))
        .collect();

    assert_eq!(
        resolved,
        vec![
            Some("#/properties/name"),
            None,
            Some("#/properties/address"),
            None,
        ]
    );
}

#[test]
fn test_evolution_unknown_verb_is_surfaced() {
    let result = parse_evolution(json!({
        "schemas": [{"$id": "a"}, {"$id": "b"}],
        "operations": [{"operation": "drop x", "source": "a", "destination": "b"}]
    }));
    assert!(matches!(
        result,
        Err(sceviz::VizError::UnknownOperationVerb { .. })
    ));
}
