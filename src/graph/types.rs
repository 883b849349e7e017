//! Graph types for architecture visualization
//!
//! These types define the output of the resolution engine. They serialize
//! to the camelCase JSON consumed by rendering and analysis tooling.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ast::{Annotation, AnnotationArg, Body, Definition, DefinitionKind, MessageKind};

// ============================================================================
// Node & edge kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeType {
    Domain,
    Service,
    Event,
    Command,
    Query,
    Channel,
    Container,
    DataProduct,
    Flow,
    Actor,
    ExternalSystem,
    User,
    Team,
    /// Unresolved flow step
    Step,
    Diagram,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Service => "service",
            Self::Event => "event",
            Self::Command => "command",
            Self::Query => "query",
            Self::Channel => "channel",
            Self::Container => "container",
            Self::DataProduct => "data-product",
            Self::Flow => "flow",
            Self::Actor => "actor",
            Self::ExternalSystem => "external-system",
            Self::User => "user",
            Self::Team => "team",
            Self::Step => "step",
            Self::Diagram => "diagram",
        }
    }

    /// Node type a definition kind renders as. Views have none; subdomains
    /// render as domains.
    pub fn for_kind(kind: DefinitionKind) -> Option<Self> {
        Some(match kind {
            DefinitionKind::Domain | DefinitionKind::Subdomain => Self::Domain,
            DefinitionKind::Service => Self::Service,
            DefinitionKind::Event => Self::Event,
            DefinitionKind::Command => Self::Command,
            DefinitionKind::Query => Self::Query,
            DefinitionKind::Channel => Self::Channel,
            DefinitionKind::Container => Self::Container,
            DefinitionKind::DataProduct => Self::DataProduct,
            DefinitionKind::Flow => Self::Flow,
            DefinitionKind::Diagram => Self::Diagram,
            DefinitionKind::User => Self::User,
            DefinitionKind::Team => Self::Team,
            DefinitionKind::Actor => Self::Actor,
            DefinitionKind::ExternalSystem => Self::ExternalSystem,
            DefinitionKind::Visualizer => return None,
        })
    }
}

impl From<MessageKind> for NodeType {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Event => Self::Event,
            MessageKind::Command => Self::Command,
            MessageKind::Query => Self::Query,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeType {
    Contains,
    Sends,
    Receives,
    RoutesTo,
    WritesTo,
    ReadsFrom,
    ReadsWrites,
    Owns,
    MemberOf,
    FlowStep,
}

impl EdgeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Sends => "sends",
            Self::Receives => "receives",
            Self::RoutesTo => "routes-to",
            Self::WritesTo => "writes-to",
            Self::ReadsFrom => "reads-from",
            Self::ReadsWrites => "reads-writes",
            Self::Owns => "owns",
            Self::MemberOf => "member-of",
            Self::FlowStep => "flow-step",
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `type:name` or `type:name@version`
pub fn node_id(node_type: NodeType, name: &str, version: Option<&str>) -> String {
    match version {
        Some(v) => format!("{}:{}@{}", node_type, name, v),
        None => format!("{}:{}", node_type, name),
    }
}

/// `source-type-target`
pub fn edge_id(source: &str, edge_type: EdgeType, target: &str) -> String {
    format!("{}-{}-{}", source, edge_type, target)
}

// ============================================================================
// Metadata
// ============================================================================

/// Structured `@note` annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl Note {
    /// Convert a `@note(...)` annotation; other annotations and empty notes
    /// yield `None`.
    pub fn from_annotation(annotation: &Annotation) -> Option<Self> {
        if annotation.name != "note" {
            return None;
        }
        let mut note = Note {
            content: String::new(),
            author: None,
            priority: None,
        };
        for arg in &annotation.args {
            match arg {
                AnnotationArg::Positional(text) if note.content.is_empty() => {
                    note.content = text.clone();
                }
                AnnotationArg::Named { key, value } if !value.is_empty() => match key.as_str() {
                    "author" => note.author = Some(value.clone()),
                    "priority" => note.priority = Some(value.clone()),
                    _ => {}
                },
                _ => {}
            }
        }
        (!note.content.is_empty()).then_some(note)
    }

    pub fn all_from(body: &Body) -> Vec<Self> {
        body.annotations()
            .into_iter()
            .filter_map(Self::from_annotation)
            .collect()
    }
}

/// Node metadata with fill-if-absent merge semantics
///
/// Typed fields cover the well-known keys; `attributes` carries the open
/// tail (container technology, residency, ...). Empty lists are treated as
/// absent so they never block a later fill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

macro_rules! fill_missing {
    ($target:expr, $source:expr, $($field:ident),+ $(,)?) => {
        $(
            if $target.$field.is_none() {
                $target.$field = $source.$field;
            }
        )+
    };
}

impl NodeMetadata {
    /// Common properties every definition kind can declare
    pub fn from_body(body: &Body) -> Self {
        Self {
            version: body.version().map(str::to_string),
            summary: body.summary().map(str::to_string),
            deprecated: body.deprecated(),
            draft: body.draft(),
            owners: non_empty(body.owners()),
            notes: non_empty(Note::all_from(body)),
            ..Self::default()
        }
    }

    /// Everything a definition declares about itself, by kind
    pub fn from_definition(def: &Definition) -> Self {
        let body = &def.body;
        let meta = Self::from_body(body).with_schema(body);
        match def.kind {
            DefinitionKind::Channel => meta.with_channel(body),
            DefinitionKind::Container => meta.with_container(body),
            DefinitionKind::User => Self {
                role: body.role().map(str::to_string),
                email: body.email().map(str::to_string),
                ..meta
            },
            DefinitionKind::Team => Self {
                email: body.email().map(str::to_string),
                ..meta
            },
            _ => meta,
        }
    }

    pub fn versioned(version: Option<&str>) -> Self {
        Self {
            version: version.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_schema(mut self, body: &Body) -> Self {
        self.schema = body.schema().map(str::to_string);
        self
    }

    /// Channel address and protocols
    pub fn with_channel(mut self, body: &Body) -> Self {
        self.address = body.address().map(str::to_string);
        self.protocols = non_empty(body.protocols());
        self
    }

    /// Container kind plus the open-ended data attributes
    pub fn with_container(mut self, body: &Body) -> Self {
        self.container_type = body.container_type().map(str::to_string);
        let strings = [
            ("technology", body.technology()),
            ("accessMode", body.access_mode()),
            ("classification", body.classification()),
            ("residency", body.residency()),
            ("retention", body.retention()),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                self.attributes
                    .insert(key.to_string(), serde_json::Value::from(value));
            }
        }
        if let Some(authoritative) = body.authoritative() {
            self.attributes
                .insert("authoritative".to_string(), serde_json::Value::from(authoritative));
        }
        self
    }

    /// Fill every absent field from `other`; present values are never touched
    pub fn merge_missing(&mut self, other: NodeMetadata) {
        fill_missing!(
            self,
            other,
            version,
            summary,
            deprecated,
            draft,
            schema,
            owners,
            notes,
            address,
            protocols,
            container_type,
            role,
            email,
        );
        for (key, value) in other.attributes {
            if value.is_null() {
                continue;
            }
            let slot = self.attributes.entry(key).or_insert(serde_json::Value::Null);
            if slot.is_null() {
                *slot = value;
            }
        }
    }
}

// ============================================================================
// Graph
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub label: String,
    /// Enclosing domain/subdomain node id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Display options declared on a view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolbar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl VisualizerOptions {
    pub fn from_body(body: &Body) -> Self {
        Self {
            legend: body.legend(),
            search: body.search(),
            toolbar: body.toolbar(),
            focus_mode: body.focus_mode(),
            animated: body.animated(),
            style: body.style().map(str::to_string),
        }
    }
}

/// Resolved graph for one view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DslGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Every declared view name, in declaration order
    pub visualizers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_visualizer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<VisualizerOptions>,
    /// True only when the document declares no views
    #[serde(default)]
    pub empty: bool,
}

impl DslGraph {
    /// The graph returned for documents without any view
    pub fn empty() -> Self {
        Self {
            empty: true,
            ..Self::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, source: &str, edge_type: EdgeType, target: &str) -> Option<&GraphEdge> {
        self.edges
            .iter()
            .find(|e| e.source == source && e.edge_type == edge_type && e.target == target)
    }

    pub fn has_edge(&self, source: &str, edge_type: EdgeType, target: &str) -> bool {
        self.edge(source, edge_type, target).is_some()
    }

    pub fn edges_of_type(&self, edge_type: EdgeType) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }

    /// Nodes whose `parentId` is `parent`
    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a GraphNode> {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_deref() == Some(parent))
    }
}
