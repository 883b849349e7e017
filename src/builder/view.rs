//! View selection and dispatch of view items
//!
//! Only the selected view's body is walked. Top-level definitions outside
//! any view are reachable solely as resolution targets.

use tracing::{debug, warn};

use super::GraphBuilder;
use crate::ast::{Definition, DefinitionKind, ResourceRef, Statement};
use crate::graph::{DslGraph, NodeMetadata, NodeType, VisualizerOptions};
use crate::normalize;

const MESSAGE_KINDS: &[DefinitionKind] = &[
    DefinitionKind::Event,
    DefinitionKind::Command,
    DefinitionKind::Query,
];

/// The requested view, else the first one. `None` only when there are no
/// views at all.
pub fn select_view<'d>(views: &[&'d Definition], requested: Option<&str>) -> Option<&'d Definition> {
    let first = *views.first()?;
    let Some(name) = requested else {
        return Some(first);
    };
    match views.iter().find(|v| v.name == name) {
        Some(view) => Some(*view),
        None => {
            warn!(requested = name, fallback = %first.name, "view not found, using first view");
            Some(first)
        }
    }
}

impl<'a> GraphBuilder<'a> {
    /// Resolve the selected view into a graph
    pub fn build(mut self, requested: Option<&str>) -> DslGraph {
        let views: Vec<&'a Definition> = self.program.visualizers().collect();
        let requested = requested
            .map(str::to_string)
            .or_else(|| self.config.default_visualizer.clone());

        let Some(active) = select_view(&views, requested.as_deref()) else {
            debug!("document declares no views");
            return DslGraph::empty();
        };

        debug!(view = %active.name, items = active.body.iter().len(), "processing view");

        for item in active.body.iter() {
            self.process_view_item(item);
        }

        if self.config.suppress_redundant_routes {
            normalize::prune_shortcuts(&mut self.store, &self.shortcuts);
        }
        if self.config.merge_read_write_edges {
            normalize::merge_read_write(&mut self.store);
        }

        let (nodes, edges) = self.store.into_parts();
        debug!(nodes = nodes.len(), edges = edges.len(), "view resolved");

        DslGraph {
            nodes,
            edges,
            visualizers: views.iter().map(|v| v.name.clone()).collect(),
            active_visualizer: Some(active.name.clone()),
            title: Some(active.label().to_string()),
            options: Some(VisualizerOptions::from_body(&active.body)),
            empty: false,
        }
    }

    fn process_view_item(&mut self, item: &'a Statement) {
        match item {
            Statement::ServiceRef(r) => self.process_reference(r, NodeType::Service),
            Statement::DomainRef(r) => self.process_reference(r, NodeType::Domain),
            Statement::ChannelRef(r) => self.process_reference(r, NodeType::Channel),
            Statement::ContainerRef(r) => self.process_reference(r, NodeType::Container),
            Statement::FlowRef(r) => self.process_reference(r, NodeType::Flow),
            Statement::DataProductRef(r) => self.process_reference(r, NodeType::DataProduct),
            Statement::Definition(def) if def.kind.is_message() && def.body.is_empty() => {
                // A body-less message inside a view references a message of that
                // name, whichever of event, command or query declares it.
                match self.index.lookup_kind(&def.name, None, MESSAGE_KINDS) {
                    Some(found) => self.process_definition(found, None),
                    None => {
                        let reference = ResourceRef::new(def.name.clone());
                        let node_type = NodeType::for_kind(def.kind).unwrap_or(NodeType::Event);
                        self.process_reference(&reference, node_type);
                    }
                }
            }
            Statement::Definition(def) if def.kind == DefinitionKind::Visualizer => {
                warn!(view = %def.name, "nested views are not supported");
            }
            Statement::Definition(def) => self.process_definition(def, None),
            _ => {}
        }
    }

    /// Process the indexed definition a view-level reference points at, or
    /// leave a placeholder when there is none.
    fn process_reference(&mut self, reference: &ResourceRef, node_type: NodeType) {
        match self
            .index
            .lookup_node(&reference.name, reference.version(), node_type)
        {
            Some(def) => self.process_definition(def, None),
            None => {
                debug!(reference = %reference, %node_type, "unresolved view reference");
                self.store.add_or_upgrade(
                    &reference.name,
                    node_type,
                    &reference.name,
                    None,
                    NodeMetadata::versioned(reference.version()),
                );
            }
        }
    }
}
