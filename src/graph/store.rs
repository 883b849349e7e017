//! Node/edge store for the graph under construction
//!
//! Nodes and edges live in arenas addressed by [`NodeIdx`]. The display id
//! of a node (`type:name@version`) is a property of the node, not its
//! identity, so upgrading a placeholder to its versioned form changes one
//! string and nothing else. Edge ids are derived from their endpoints when
//! the store is turned into a [`DslGraph`](super::types::DslGraph).

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, trace};

use super::types::{edge_id, node_id, EdgeType, GraphEdge, GraphNode, NodeMetadata, NodeType};
use crate::version;

/// Stable handle to a node in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

#[derive(Debug, Clone)]
pub struct StoredNode {
    id: String,
    name: String,
    node_type: NodeType,
    label: String,
    parent: Option<NodeIdx>,
    metadata: NodeMetadata,
}

impl StoredNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Bare reference name (without type or version)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<NodeIdx> {
        self.parent
    }

    pub fn version(&self) -> Option<&str> {
        self.metadata.version.as_deref()
    }

    pub fn metadata(&self) -> &NodeMetadata {
        &self.metadata
    }
}

#[derive(Debug, Clone)]
struct StoredEdge {
    source: NodeIdx,
    target: NodeIdx,
    edge_type: EdgeType,
    label: Option<String>,
}

type EdgeKey = (NodeIdx, EdgeType, NodeIdx);

#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Vec<StoredNode>,
    by_id: HashMap<String, NodeIdx>,
    /// Every node for a (type, bare name), in creation order
    by_ref: HashMap<(NodeType, String), Vec<NodeIdx>>,
    /// Removed edges leave a `None` so edge order stays stable
    edges: Vec<Option<StoredEdge>>,
    edge_keys: HashMap<EdgeKey, usize>,
    outgoing: Vec<Vec<usize>>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, idx: NodeIdx) -> &StoredNode {
        &self.nodes[idx.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn lookup(&self, id: &str) -> Option<NodeIdx> {
        self.by_id.get(id).copied()
    }

    /// Nodes in creation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &StoredNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeIdx(i), n))
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Find a node for a reference.
    ///
    /// With a version only the exact `type:name@version` node matches. Without
    /// one, the candidate carrying the highest valid version wins; ties and
    /// invalid versions keep the earliest candidate.
    pub fn resolve(&self, name: &str, node_type: NodeType, version: Option<&str>) -> Option<NodeIdx> {
        if version.is_some() {
            return self.lookup(&node_id(node_type, name, version));
        }

        let candidates = self.by_ref.get(&(node_type, name.to_string()))?;
        let mut latest = *candidates.first()?;
        for &candidate in &candidates[1..] {
            if version::supersedes(self.node(candidate).version(), self.node(latest).version()) {
                latest = candidate;
            }
        }
        Some(latest)
    }

    /// Insert a node or converge onto an existing one.
    ///
    /// 1. exact id exists: merge metadata and return it
    /// 2. unversioned call with a resolvable versioned node: reuse it
    /// 3. versioned call with an unversioned placeholder: upgrade the placeholder
    /// 4. otherwise create a node
    pub fn add_or_upgrade(
        &mut self,
        name: &str,
        node_type: NodeType,
        label: &str,
        parent: Option<NodeIdx>,
        metadata: NodeMetadata,
    ) -> NodeIdx {
        let version = metadata.version.clone();
        let id = node_id(node_type, name, version.as_deref());

        if let Some(idx) = self.lookup(&id) {
            self.converge(idx, label, parent, metadata);
            return idx;
        }

        match version.as_deref() {
            None => {
                if let Some(idx) = self.resolve(name, node_type, None) {
                    trace!(id = %self.node(idx).id, reference = %id, "reusing versioned node");
                    self.converge(idx, label, parent, metadata);
                    return idx;
                }
            }
            Some(v) => {
                if let Some(idx) = self.lookup(&node_id(node_type, name, None)) {
                    self.upgrade(idx, v);
                    self.converge(idx, label, parent, metadata);
                    return idx;
                }
            }
        }

        let idx = NodeIdx(self.nodes.len());
        debug!(%id, "creating node");
        self.by_id.insert(id.clone(), idx);
        self.by_ref
            .entry((node_type, name.to_string()))
            .or_default()
            .push(idx);
        self.nodes.push(StoredNode {
            id,
            name: name.to_string(),
            node_type,
            label: label.to_string(),
            parent,
            metadata,
        });
        self.outgoing.push(Vec::new());
        idx
    }

    /// Move an unversioned placeholder to its versioned id.
    ///
    /// Edges point at arena indices, so every edge touching the node picks up
    /// the new id when the graph is emitted. Returns false when the node is
    /// already versioned or the target id is taken.
    pub fn upgrade(&mut self, idx: NodeIdx, version: &str) -> bool {
        let node = &self.nodes[idx.0];
        if node.metadata.version.is_some() {
            return false;
        }
        let new_id = node_id(node.node_type, &node.name, Some(version));
        if self.by_id.contains_key(&new_id) {
            return false;
        }

        let old_id = std::mem::replace(&mut self.nodes[idx.0].id, new_id.clone());
        debug!(%old_id, %new_id, "upgrading placeholder");
        self.by_id.remove(&old_id);
        self.by_id.insert(new_id, idx);
        self.nodes[idx.0].metadata.version = Some(version.to_string());
        true
    }

    fn converge(&mut self, idx: NodeIdx, label: &str, parent: Option<NodeIdx>, metadata: NodeMetadata) {
        self.set_parent_if_missing(idx, parent);
        self.metadata_mut(idx).merge_missing(metadata);
        self.relabel(idx, label);
    }

    pub fn set_parent_if_missing(&mut self, idx: NodeIdx, parent: Option<NodeIdx>) {
        let node = &mut self.nodes[idx.0];
        if node.parent.is_none() && parent != Some(idx) {
            node.parent = parent;
        }
    }

    /// Replace a label that still equals the bare name
    pub fn relabel(&mut self, idx: NodeIdx, label: &str) {
        let node = &mut self.nodes[idx.0];
        if label != node.name && node.label == node.name {
            node.label = label.to_string();
        }
    }

    pub fn metadata_mut(&mut self, idx: NodeIdx) -> &mut NodeMetadata {
        &mut self.nodes[idx.0].metadata
    }

    /// First node created with this bare name, of any type
    pub fn first_named(&self, name: &str) -> Option<&StoredNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    // ========================================================================
    // Edges
    // ========================================================================

    /// Add an edge. A duplicate `(source, type, target)` is a no-op and
    /// returns false.
    pub fn add_edge(
        &mut self,
        source: NodeIdx,
        target: NodeIdx,
        edge_type: EdgeType,
        label: Option<&str>,
    ) -> bool {
        let key = (source, edge_type, target);
        if self.edge_keys.contains_key(&key) {
            return false;
        }
        let slot = self.edges.len();
        self.edges.push(Some(StoredEdge {
            source,
            target,
            edge_type,
            label: label.map(str::to_string),
        }));
        self.edge_keys.insert(key, slot);
        self.outgoing[source.0].push(slot);
        true
    }

    pub fn remove_edge(&mut self, source: NodeIdx, edge_type: EdgeType, target: NodeIdx) -> bool {
        let Some(slot) = self.edge_keys.remove(&(source, edge_type, target)) else {
            return false;
        };
        self.edges[slot] = None;
        self.outgoing[source.0].retain(|&s| s != slot);
        true
    }

    pub fn has_edge(&self, source: NodeIdx, edge_type: EdgeType, target: NodeIdx) -> bool {
        self.edge_keys.contains_key(&(source, edge_type, target))
    }

    pub fn edge_label(&self, source: NodeIdx, edge_type: EdgeType, target: NodeIdx) -> Option<&str> {
        let slot = *self.edge_keys.get(&(source, edge_type, target))?;
        self.edges[slot].as_ref()?.label.as_deref()
    }

    /// Live edges of one type as `(source, target)`, in insertion order
    pub fn edges_of_type(&self, edge_type: EdgeType) -> Vec<(NodeIdx, NodeIdx)> {
        self.edges
            .iter()
            .flatten()
            .filter(|e| e.edge_type == edge_type)
            .map(|e| (e.source, e.target))
            .collect()
    }

    /// Breadth-first reachability over edges of `via`, ignoring the direct
    /// `from -> to` edge when `skip_direct` is set.
    pub fn reaches(&self, from: NodeIdx, to: NodeIdx, via: EdgeType, skip_direct: bool) -> bool {
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(current) = queue.pop_front() {
            for &slot in &self.outgoing[current.0] {
                let Some(edge) = &self.edges[slot] else {
                    continue;
                };
                if edge.edge_type != via {
                    continue;
                }
                if skip_direct && current == from && edge.target == to {
                    continue;
                }
                if edge.target == to {
                    return true;
                }
                if seen.insert(edge.target) {
                    queue.push_back(edge.target);
                }
            }
        }
        false
    }

    // ========================================================================
    // Output
    // ========================================================================

    pub fn into_parts(self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let edges = self
            .edges
            .iter()
            .flatten()
            .map(|e| {
                let source = self.nodes[e.source.0].id.clone();
                let target = self.nodes[e.target.0].id.clone();
                GraphEdge {
                    id: edge_id(&source, e.edge_type, &target),
                    source,
                    target,
                    edge_type: e.edge_type,
                    label: e.label.clone(),
                }
            })
            .collect();

        let parent_ids: Vec<Option<String>> = self
            .nodes
            .iter()
            .map(|n| n.parent.map(|p| self.nodes[p.0].id.clone()))
            .collect();

        let nodes = self
            .nodes
            .into_iter()
            .zip(parent_ids)
            .map(|(n, parent_id)| GraphNode {
                id: n.id,
                node_type: n.node_type,
                label: n.label,
                parent_id,
                metadata: n.metadata,
            })
            .collect();

        (nodes, edges)
    }
}
