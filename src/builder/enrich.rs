//! Metadata enrichment from indexed definitions
//!
//! A node first seen as a bare reference (`sends event X to Bus`) picks up
//! whatever its full definition declares: summary, owners, flags, schema,
//! notes, channel address/protocols, container attributes, display name.
//! Values already on the node are never overwritten.
//!
//! Channel definitions found this way also contribute their `route`
//! statements, which is how routing chains declared outside the view end
//! up in the graph.

use tracing::trace;

use super::GraphBuilder;
use crate::ast::{Body, DefinitionKind};
use crate::graph::{EdgeType, NodeIdx, NodeMetadata, NodeType, Note};

impl<'a> GraphBuilder<'a> {
    pub(super) fn enrich(&mut self, idx: NodeIdx) {
        let node = self.store.node(idx);
        let name = node.name().to_string();
        let node_type = node.node_type();
        let version = node.version().map(str::to_string);

        // Each (node, version) is enriched once; this also breaks route cycles.
        if !self.enriched.insert((idx, version.clone())) {
            return;
        }

        // A pinned node also takes metadata from a definition that declares no
        // version, never from one declaring a different version.
        let def = self
            .index
            .lookup_node(&name, version.as_deref(), node_type)
            .or_else(|| {
                version
                    .as_ref()
                    .and_then(|_| self.index.unversioned_node(&name, node_type))
            });
        let Some(def) = def else {
            return;
        };
        trace!(node = %self.store.node(idx).id(), def_version = ?def.version(), "enriching");

        let mut meta = NodeMetadata::from_definition(def);
        if version.is_none() {
            if let Some(def_version) = def.version() {
                if self.store.upgrade(idx, def_version) {
                    self.enriched.insert((idx, Some(def_version.to_string())));
                } else {
                    meta.version = None;
                }
            }
        }
        self.store.metadata_mut(idx).merge_missing(meta);
        if let Some(label) = def.body.display_name() {
            self.store.relabel(idx, label);
        }

        if def.kind == DefinitionKind::Channel {
            for route in def.body.routes() {
                let target =
                    self.resolve_or_create(&route.name, NodeType::Channel, route.version(), None);
                self.store.add_edge(idx, target, EdgeType::RoutesTo, None);
            }
        }
    }

    /// Fill summary, schema, and notes from an inline sends/receives body
    pub(super) fn apply_inline_body(&mut self, idx: NodeIdx, body: &Body) {
        if body.is_empty() {
            return;
        }
        let notes = Note::all_from(body);
        self.store.metadata_mut(idx).merge_missing(NodeMetadata {
            summary: body.summary().map(str::to_string),
            schema: body.schema().map(str::to_string),
            notes: (!notes.is_empty()).then_some(notes),
            ..NodeMetadata::default()
        });
    }
}
