//! Graph output model and the mutable store it is built in
//!
//! - `types`: serializable `DslGraph`, nodes, edges, metadata
//! - `store`: arena-backed node/edge store with identity and merge rules

pub mod store;
pub mod types;

pub use store::{NodeIdx, NodeStore, StoredNode};
pub use types::{
    edge_id, node_id, DslGraph, EdgeType, GraphEdge, GraphNode, NodeMetadata, NodeType, Note,
    VisualizerOptions,
};
