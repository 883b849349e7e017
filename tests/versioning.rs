//! Version handling: latest-wins lookup, exact references, placeholder
//! upgrade, and coexisting versions of one resource.

mod helpers;

use ec_graph::{ast_to_graph, DefinitionIndex, DefinitionKind as K, EdgeType, MessageKind, Statement};
use helpers::*;
use pretty_assertions::assert_eq;

fn order_service(version: &str, label: &str) -> ec_graph::Definition {
    versioned(K::Service, "OrderService", version).with(Statement::name(label))
}

#[test]
fn test_latest_version_wins_regardless_of_order() {
    let program = program(vec![
        order_service("3.0.0", "Order Service V3"),
        order_service("1.0.0", "Order Service V1"),
        order_service("2.0.0", "Order Service V2"),
        view_of("main", vec![Statement::ServiceRef(rref("OrderService"))]),
    ]);

    let graph = ast_to_graph(&program, None);

    assert_eq!(graph.nodes.len(), 1);
    let node = &graph.nodes[0];
    assert_eq!(node.id, "service:OrderService@3.0.0");
    assert_eq!(node.label, "Order Service V3");
}

#[test]
fn test_exact_version_reference() {
    let program = program(vec![
        order_service("1.0.0", "Order Service V1"),
        order_service("2.0.0", "Order Service V2"),
        view_of("main", vec![Statement::ServiceRef(rref("OrderService@1.0.0"))]),
    ]);

    let graph = ast_to_graph(&program, None);

    let node = graph.node("service:OrderService@1.0.0").expect("exact version node");
    assert_eq!(node.label, "Order Service V1");
    assert!(graph.node("service:OrderService@2.0.0").is_none());
}

#[test]
fn test_missing_exact_version_does_not_fall_back() {
    let program = program(vec![
        order_service("1.0.0", "Order Service V1"),
        view_of("main", vec![Statement::ServiceRef(rref("OrderService@9.9.9"))]),
    ]);

    let graph = ast_to_graph(&program, None);

    let node = graph.node("service:OrderService@9.9.9").expect("placeholder");
    assert_eq!(node.label, "OrderService");
    assert_eq!(node.metadata.version.as_deref(), Some("9.9.9"));
    assert!(graph.node("service:OrderService@1.0.0").is_none());
}

#[test]
fn test_placeholder_upgrade_keeps_edges() {
    let program = program(vec![view(
        "main",
        vec![
            def(K::Service, "Web").with(sends_stmt(sends(MessageKind::Command, "CreateOrder"))),
            def(K::Service, "Orders").with(receives_stmt(
                sends(MessageKind::Command, "CreateOrder").version("1.0.0"),
            )),
        ],
    )]);

    let graph = ast_to_graph(&program, None);

    assert!(graph.node("command:CreateOrder").is_none());
    assert!(graph.has_edge("service:Web", EdgeType::Sends, "command:CreateOrder@1.0.0"));
    assert!(graph.has_edge("command:CreateOrder@1.0.0", EdgeType::Receives, "service:Orders"));
    assert_eq!(
        graph
            .edge("service:Web", EdgeType::Sends, "command:CreateOrder@1.0.0")
            .map(|e| e.id.as_str()),
        Some("service:Web-sends-command:CreateOrder@1.0.0")
    );
}

#[test]
fn test_unversioned_reference_reuses_versioned_node() {
    let program = program(vec![view(
        "main",
        vec![
            def(K::Service, "Payments").with(sends_stmt(event("PaymentProcessed").version("1.0.0"))),
            def(K::Service, "Orders").with(receives_stmt(event("PaymentProcessed"))),
        ],
    )]);

    let graph = ast_to_graph(&program, None);

    assert!(graph.node("event:PaymentProcessed").is_none());
    assert!(graph.has_edge(
        "event:PaymentProcessed@1.0.0",
        EdgeType::Receives,
        "service:Orders"
    ));
}

#[test]
fn test_multiple_versions_coexist() {
    let program = program(vec![view(
        "main",
        vec![
            def(K::Service, "LegacyOrders").with(sends_stmt(event("OrderCreated").version("1.0.0"))),
            def(K::Service, "Orders").with(sends_stmt(event("OrderCreated").version("2.0.0"))),
            def(K::Service, "Billing").with(receives_stmt(event("OrderCreated").version("1.0.0"))),
            def(K::Service, "Shipping").with(receives_stmt(event("OrderCreated").version("2.0.0"))),
            def(K::Service, "Analytics").with(receives_stmt(event("OrderCreated"))),
        ],
    )]);

    let graph = ast_to_graph(&program, None);

    let v1 = "event:OrderCreated@1.0.0";
    let v2 = "event:OrderCreated@2.0.0";
    assert!(graph.has_edge("service:LegacyOrders", EdgeType::Sends, v1));
    assert!(graph.has_edge("service:Orders", EdgeType::Sends, v2));
    assert!(graph.has_edge(v1, EdgeType::Receives, "service:Billing"));
    assert!(graph.has_edge(v2, EdgeType::Receives, "service:Shipping"));
    assert!(!graph.has_edge(v1, EdgeType::Receives, "service:Shipping"));

    // A bare reference lands on the highest version present.
    assert!(graph.has_edge(v2, EdgeType::Receives, "service:Analytics"));
    assert_eq!(graph.nodes.iter().filter(|n| n.label == "OrderCreated").count(), 2);
}

#[test]
fn test_bare_reference_upgraded_from_latest_definition() {
    let program = program(vec![
        versioned(K::Event, "OrderCreated", "1.0.0").with(Statement::summary("v1")),
        versioned(K::Event, "OrderCreated", "2.0.0").with(Statement::summary("v2")),
        view(
            "main",
            vec![def(K::Service, "Orders").with(sends_stmt(event("OrderCreated")))],
        ),
    ]);

    let graph = ast_to_graph(&program, None);

    let node = graph.node("event:OrderCreated@2.0.0").expect("upgraded node");
    assert_eq!(node.metadata.summary.as_deref(), Some("v2"));
    assert!(graph.has_edge("service:Orders", EdgeType::Sends, "event:OrderCreated@2.0.0"));
}

#[test]
fn test_enrichment_is_kind_checked() {
    let program = program(vec![
        versioned(K::Domain, "Orders", "1.0.0").with(Statement::summary("the domain")),
        view(
            "main",
            vec![def(K::Service, "Api").with(sends_stmt(event("Ping").via(["Orders"])))],
        ),
    ]);

    let graph = ast_to_graph(&program, None);

    let channel = graph.node("channel:Orders").expect("channel keeps its own identity");
    assert_eq!(channel.metadata.summary, None);
}

#[test]
fn test_index_version_ordering() {
    let program = program(vec![
        versioned(K::Service, "A", "latest"),
        versioned(K::Service, "A", "1.0.0"),
        versioned(K::Service, "B", "1.5.0"),
        versioned(K::Service, "B", "v2.0.0"),
        versioned(K::Service, "C", "2.0.0"),
        versioned(K::Service, "C", "2.0.0-beta.1"),
        versioned(K::Service, "D", "1.10.0"),
        versioned(K::Service, "D", "1.9.0"),
        def(K::Service, "E"),
        versioned(K::Service, "E", "0.0.1"),
    ]);

    let index = DefinitionIndex::build(&program);
    let latest = |name: &str| index.latest(name).and_then(|d| d.version());

    assert_eq!(latest("A"), Some("1.0.0"), "valid beats invalid");
    assert_eq!(latest("B"), Some("v2.0.0"), "leading v tolerated");
    assert_eq!(latest("C"), Some("2.0.0"), "release beats prerelease");
    assert_eq!(latest("D"), Some("1.10.0"), "numeric, not lexicographic");
    assert_eq!(latest("E"), Some("0.0.1"), "any version beats none");
    assert_eq!(
        index.exact("C", "2.0.0-beta.1").and_then(|d| d.version()),
        Some("2.0.0-beta.1")
    );
}
