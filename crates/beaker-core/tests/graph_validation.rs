//! Validación estructural del grafo: referencias desconocidas, ciclos y
//! destinos de error mal formados se rechazan en tiempo de construcción.

use beaker_core::{BeakerNode, EdgeDecl, EdgeKind, ErrorRecord, Graph, GraphError};

fn node(name: &str, schema: &'static str, durable: bool) -> BeakerNode {
    BeakerNode {
        name: name.to_string(),
        schema_name: schema,
        durable,
    }
}

#[test]
fn edge_to_unknown_beaker_is_rejected() {
    let mut graph = Graph::new();
    graph.add_beaker(node("a", "schema_a", false)).unwrap();

    let err = graph
        .add_edge(EdgeDecl {
            name: "a_to_b".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: "a".to_string(),
            to_beakers: vec!["b".to_string()],
            error_destinations: vec![],
            input_schema: None,
            output_schema: None,
        })
        .unwrap_err();

    assert_eq!(err, GraphError::UnknownBeaker("b".to_string()));
}

#[test]
fn cycles_are_rejected() {
    let mut graph = Graph::new();
    graph.add_beaker(node("a", "schema_a", false)).unwrap();
    graph.add_beaker(node("b", "schema_b", false)).unwrap();

    graph
        .add_edge(EdgeDecl {
            name: "a_to_b".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: "a".to_string(),
            to_beakers: vec!["b".to_string()],
            error_destinations: vec![],
            input_schema: None,
            output_schema: None,
        })
        .unwrap();

    let err = graph
        .add_edge(EdgeDecl {
            name: "b_to_a".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: "b".to_string(),
            to_beakers: vec!["a".to_string()],
            error_destinations: vec![],
            input_schema: None,
            output_schema: None,
        })
        .unwrap_err();

    assert!(matches!(err, GraphError::CycleDetected { .. }));
}

#[test]
fn error_destination_must_be_durable_with_error_schema() {
    let mut graph = Graph::new();
    graph.add_beaker(node("a", "schema_a", false)).unwrap();
    graph.add_beaker(node("b", "schema_b", false)).unwrap();
    graph.add_beaker(node("not_durable_errors", ErrorRecord::SCHEMA_NAME, false)).unwrap();

    let err = graph
        .add_edge(EdgeDecl {
            name: "a_to_b".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: "a".to_string(),
            to_beakers: vec!["b".to_string()],
            error_destinations: vec!["not_durable_errors".to_string()],
            input_schema: None,
            output_schema: None,
        })
        .unwrap_err();

    assert!(matches!(err, GraphError::InvalidErrorDestination(_)));
}

#[test]
fn duplicate_beaker_names_are_rejected() {
    let mut graph = Graph::new();
    graph.add_beaker(node("a", "schema_a", false)).unwrap();
    let err = graph.add_beaker(node("a", "schema_a", false)).unwrap_err();
    assert_eq!(err, GraphError::DuplicateBeaker("a".to_string()));
}

#[test]
fn topo_order_respects_edges() {
    let mut graph = Graph::new();
    graph.add_beaker(node("a", "schema_a", false)).unwrap();
    graph.add_beaker(node("b", "schema_b", false)).unwrap();
    graph.add_beaker(node("c", "schema_c", false)).unwrap();
    graph
        .add_edge(EdgeDecl {
            name: "a_to_b".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: "a".to_string(),
            to_beakers: vec!["b".to_string()],
            error_destinations: vec![],
            input_schema: None,
            output_schema: None,
        })
        .unwrap();
    graph
        .add_edge(EdgeDecl {
            name: "b_to_c".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: "b".to_string(),
            to_beakers: vec!["c".to_string()],
            error_destinations: vec![],
            input_schema: None,
            output_schema: None,
        })
        .unwrap();

    let order = graph.topo_order();
    let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
    assert!(pos("a") < pos("b"));
    assert!(pos("b") < pos("c"));
}

#[test]
fn edge_schema_mismatch_is_rejected() {
    let mut graph = Graph::new();
    graph.add_beaker(node("a", "schema_a", false)).unwrap();
    graph.add_beaker(node("b", "schema_b", false)).unwrap();

    let err = graph
        .add_edge(EdgeDecl {
            name: "a_to_b".to_string(),
            kind: EdgeKind::Transform,
            from_beaker: "a".to_string(),
            to_beakers: vec!["b".to_string()],
            error_destinations: vec![],
            input_schema: Some("schema_a"),
            output_schema: Some("schema_not_b"),
        })
        .unwrap_err();

    assert!(matches!(err, GraphError::TypeMismatch { .. }));
}
