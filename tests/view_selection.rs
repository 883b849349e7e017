//! View selection, display options, and the JSON output shape.

mod helpers;

use ec_graph::{ast_to_graph, ast_to_graph_with_config, DefinitionKind as K, GraphConfig, NodeType, Statement};
use helpers::*;
use pretty_assertions::assert_eq;

fn two_views() -> ec_graph::Program {
    program(vec![
        view("overview", vec![versioned(K::Service, "OrderService", "1.0.0")]),
        view(
            "detail",
            vec![
                versioned(K::Service, "OrderService", "1.0.0"),
                versioned(K::Service, "BillingService", "1.0.0"),
            ],
        ),
    ])
}

#[test]
fn test_select_view_by_name() {
    let program = two_views();

    let overview = ast_to_graph(&program, Some("overview"));
    assert_eq!(overview.nodes.len(), 1);
    assert_eq!(overview.active_visualizer.as_deref(), Some("overview"));

    let detail = ast_to_graph(&program, Some("detail"));
    assert_eq!(detail.nodes.len(), 2);
    assert_eq!(detail.active_visualizer.as_deref(), Some("detail"));
    assert_eq!(detail.visualizers, vec!["overview".to_string(), "detail".to_string()]);
}

#[test]
fn test_first_view_by_default_and_on_unknown_name() {
    let program = two_views();

    for requested in [None, Some("no-such-view")] {
        let graph = ast_to_graph(&program, requested);
        assert!(!graph.empty);
        assert_eq!(graph.active_visualizer.as_deref(), Some("overview"), "{requested:?}");
        assert_eq!(graph.nodes.len(), 1);
    }
}

#[test]
fn test_default_view_from_config() {
    let program = two_views();
    let config = GraphConfig {
        default_visualizer: Some("detail".into()),
        ..GraphConfig::default()
    };

    let graph = ast_to_graph_with_config(&program, None, &config);
    assert_eq!(graph.active_visualizer.as_deref(), Some("detail"));

    // An explicit request still wins.
    let graph = ast_to_graph_with_config(&program, Some("overview"), &config);
    assert_eq!(graph.active_visualizer.as_deref(), Some("overview"));
}

#[test]
fn test_resolutions_are_independent() {
    let program = two_views();

    let first = ast_to_graph(&program, Some("detail"));
    let _ = ast_to_graph(&program, Some("overview"));
    let again = ast_to_graph(&program, Some("detail"));

    assert_eq!(first, again);
}

#[test]
fn test_title_and_display_options() {
    let program = program(vec![
        view_of(
            "main",
            vec![
                Statement::name("Order Platform"),
                Statement::Legend(false),
                Statement::Search(true),
                Statement::FocusMode(true),
                Statement::Style("dark".into()),
            ],
        ),
        view("plain", vec![]),
    ]);

    let graph = ast_to_graph(&program, None);
    assert_eq!(graph.title.as_deref(), Some("Order Platform"));
    let options = graph.options.expect("options");
    assert_eq!(options.legend, Some(false));
    assert_eq!(options.search, Some(true));
    assert_eq!(options.focus_mode, Some(true));
    assert_eq!(options.toolbar, None);
    assert_eq!(options.style.as_deref(), Some("dark"));

    let plain = ast_to_graph(&program, Some("plain"));
    assert_eq!(plain.title.as_deref(), Some("plain"));
    assert!(!plain.empty, "a view with no items is still a view");
    assert!(plain.nodes.is_empty());
}

#[test]
fn test_only_view_items_are_emitted() {
    let program = program(vec![
        versioned(K::Service, "Unused", "1.0.0"),
        versioned(K::Domain, "AlsoUnused", "1.0.0")
            .nest(versioned(K::Service, "Nested", "1.0.0")),
        view("main", vec![def(K::Service, "Used")]),
    ]);

    let graph = ast_to_graph(&program, None);

    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["service:Used"]);
}

#[test]
fn test_view_references_expand_definitions() {
    let program = program(vec![
        versioned(K::Service, "Orders", "1.0.0").with(sends_stmt(event("OrderPlaced"))),
        versioned(K::Event, "OrderPlaced", "1.0.0").with(Statement::summary("An order was placed")),
        view_of(
            "main",
            vec![
                Statement::ServiceRef(rref("Orders")),
                Statement::DomainRef(rref("Missing")),
                Statement::ChannelRef(rref("bus@2.0.0")),
            ],
        ),
    ]);

    let graph = ast_to_graph(&program, None);

    assert!(graph.has_edge(
        "service:Orders@1.0.0",
        ec_graph::EdgeType::Sends,
        "event:OrderPlaced@1.0.0"
    ));
    assert_eq!(
        graph
            .node("event:OrderPlaced@1.0.0")
            .and_then(|n| n.metadata.summary.as_deref()),
        Some("An order was placed")
    );
    assert_eq!(graph.node("domain:Missing").map(|n| n.node_type), Some(NodeType::Domain));
    assert!(graph.node("channel:bus@2.0.0").is_some());
}

#[test]
fn test_bodiless_message_in_view_is_a_reference() {
    let program = program(vec![
        versioned(K::Event, "OrderCreated", "1.0.0").with(Statement::summary("Created")),
        view("main", vec![def(K::Event, "OrderCreated")]),
    ]);

    let graph = ast_to_graph(&program, None);

    assert_eq!(graph.nodes.len(), 1);
    let node = &graph.nodes[0];
    assert_eq!(node.id, "event:OrderCreated@1.0.0");
    assert_eq!(node.metadata.summary.as_deref(), Some("Created"));
}

#[test]
fn test_bodiless_message_resolves_across_message_kinds() {
    let program = program(vec![
        versioned(K::Command, "PlaceOrder", "1.2.0").with(Statement::summary("Place it")),
        view("main", vec![def(K::Event, "PlaceOrder"), def(K::Query, "Missing")]),
    ]);

    let graph = ast_to_graph(&program, None);

    let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["command:PlaceOrder@1.2.0", "query:Missing"]);
    let command = graph.node("command:PlaceOrder@1.2.0").expect("command");
    assert_eq!(command.metadata.summary.as_deref(), Some("Place it"));
    assert!(graph.node("event:PlaceOrder").is_none());
}

#[test]
fn test_output_json_shape() {
    let program = program(vec![view(
        "main",
        vec![def(K::Domain, "Orders").nest(
            def(K::Service, "OrderService").with(sends_stmt(event("OrderPlaced").via(["bus"]))),
        )],
    )]);

    let graph = ast_to_graph(&program, None);
    let json = serde_json::to_value(&graph).expect("graph serializes");

    assert_eq!(json["activeVisualizer"], "main");
    assert_eq!(json["empty"], false);
    assert_eq!(json["visualizers"], serde_json::json!(["main"]));

    let service = json["nodes"]
        .as_array()
        .and_then(|nodes| nodes.iter().find(|n| n["id"] == "service:OrderService"))
        .expect("service node");
    assert_eq!(service["type"], "service");
    assert_eq!(service["parentId"], "domain:Orders");

    let types: Vec<&str> = json["edges"]
        .as_array()
        .map(|edges| edges.iter().filter_map(|e| e["type"].as_str()).collect())
        .unwrap_or_default();
    assert!(types.contains(&"routes-to"));
    assert!(types.contains(&"contains"));

    let roundtrip: ec_graph::DslGraph = serde_json::from_value(json).expect("graph deserializes");
    assert_eq!(roundtrip, graph);
}
