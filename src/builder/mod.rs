//! GraphBuilder - resolves one view of a document into a `DslGraph`
//!
//! ```text
//!   Program ──► DefinitionIndex (all top-level + domain-nested defs)
//!      │
//!      └─► selected view body
//!             │  dispatch per item (view.rs)
//!             ▼
//!          processors.rs ──► routing.rs (sends/receives/channels)
//!             │                  │
//!             └──── resolve_or_create ──► enrich.rs (fill from index)
//!                          │
//!                          ▼
//!                      NodeStore ──► normalize ──► DslGraph
//! ```
//!
//! A builder is single-use: it owns its store, and `build` consumes it.
//! Resolving two views (or one view twice) means two builders.

mod enrich;
mod processors;
mod routing;
mod view;

use std::collections::HashSet;

use crate::ast::Program;
use crate::config::GraphConfig;
use crate::graph::{NodeIdx, NodeMetadata, NodeStore, NodeType};
use crate::index::DefinitionIndex;

pub struct GraphBuilder<'a> {
    program: &'a Program,
    index: DefinitionIndex<'a>,
    config: GraphConfig,
    store: NodeStore,
    /// (node, version at the time) pairs already enriched
    enriched: HashSet<(NodeIdx, Option<String>)>,
    /// message→channel edges added on the receives side
    shortcuts: Vec<(NodeIdx, NodeIdx)>,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(program: &'a Program, config: GraphConfig) -> Self {
        Self {
            program,
            index: DefinitionIndex::build(program),
            config,
            store: NodeStore::new(),
            enriched: HashSet::new(),
            shortcuts: Vec::new(),
        }
    }

    /// Find a node for a reference, or create a placeholder, then enrich it
    /// from the index.
    fn resolve_or_create(
        &mut self,
        name: &str,
        node_type: NodeType,
        version: Option<&str>,
        parent: Option<NodeIdx>,
    ) -> NodeIdx {
        let idx = match self.store.resolve(name, node_type, version) {
            Some(idx) => {
                self.store.set_parent_if_missing(idx, parent);
                idx
            }
            None => self.store.add_or_upgrade(
                name,
                node_type,
                name,
                parent,
                NodeMetadata::versioned(version),
            ),
        };
        self.enrich(idx);
        idx
    }

    /// `contains` edge from an optional parent
    fn attach(&mut self, parent: Option<NodeIdx>, child: NodeIdx) {
        if let Some(parent) = parent {
            if parent != child {
                self.store
                    .add_edge(parent, child, crate::graph::EdgeType::Contains, None);
            }
        }
    }
}
