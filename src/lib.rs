//! ec-graph: resolves an architecture-description AST into a typed graph
//!
//! This crate contains the resolution engine with NO parser or renderer:
//! - AST types (Program, Definition, Statement, Body accessors)
//! - Definition index with semantic-version "latest wins" lookup
//! - Arena-backed node/edge store with placeholder upgrade
//! - Per-kind processors, channel routing, metadata enrichment
//! - View selection and the empty-graph rule
//! - YAML configuration
//!
//! ```no_run
//! use ec_graph::{ast_to_graph, Program};
//!
//! let program = Program::from_path("catalog.json")?;
//! let graph = ast_to_graph(&program, Some("overview"));
//! println!("{}", serde_json::to_string_pretty(&graph)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Resolution is infallible and pure: one call, one fresh store, no I/O.

pub mod ast;
pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod index;
pub mod normalize;
pub mod version;

// Re-export commonly used types
pub use ast::{
    Body, ChannelClause, Definition, DefinitionKind, MessageKind, MessageStmt, Program,
    ResourceRef, Statement,
};
pub use builder::GraphBuilder;
pub use config::GraphConfig;
pub use error::{EcGraphError, Result};
pub use graph::{DslGraph, EdgeType, GraphEdge, GraphNode, NodeMetadata, NodeType, Note};
pub use index::DefinitionIndex;

/// Resolve one view of `program` with the default configuration.
///
/// `visualizer` names the view; `None` (or an unknown name) selects the
/// first declared view. A document with no views yields
/// [`DslGraph::empty`].
pub fn ast_to_graph(program: &Program, visualizer: Option<&str>) -> DslGraph {
    ast_to_graph_with_config(program, visualizer, &GraphConfig::default())
}

#[tracing::instrument(skip_all, fields(visualizer = ?visualizer))]
pub fn ast_to_graph_with_config(
    program: &Program,
    visualizer: Option<&str>,
    config: &GraphConfig,
) -> DslGraph {
    GraphBuilder::new(program, config.clone()).build(visualizer)
}
