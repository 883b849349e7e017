//! Typed AST consumed by the resolution engine
//!
//! The engine never parses source text. An external parser produces a
//! [`Program`] (or a JSON dump of one) and hands it over. Every type here
//! round-trips through serde so parsers written in other languages can feed
//! the engine through JSON.
//!
//! Statements are a closed enum. Processors go through the typed accessors
//! on [`Body`] and never match raw statements themselves.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcGraphError, Result};

// ============================================================================
// Program & definitions
// ============================================================================

/// A parsed document: the ordered list of top-level definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

impl Program {
    pub fn new(definitions: Vec<Definition>) -> Self {
        Self { definitions }
    }

    /// Parse a JSON-serialized AST
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON-serialized AST from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| EcGraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// All view definitions, in declaration order
    pub fn visualizers(&self) -> impl Iterator<Item = &Definition> {
        self.definitions
            .iter()
            .filter(|d| d.kind == DefinitionKind::Visualizer)
    }
}

/// Definition variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefinitionKind {
    Domain,
    Subdomain,
    Service,
    Event,
    Command,
    Query,
    Channel,
    Container,
    DataProduct,
    Flow,
    Diagram,
    User,
    Team,
    Actor,
    ExternalSystem,
    Visualizer,
}

impl DefinitionKind {
    pub fn is_message(self) -> bool {
        matches!(self, Self::Event | Self::Command | Self::Query)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Subdomain => "subdomain",
            Self::Service => "service",
            Self::Event => "event",
            Self::Command => "command",
            Self::Query => "query",
            Self::Channel => "channel",
            Self::Container => "container",
            Self::DataProduct => "data-product",
            Self::Flow => "flow",
            Self::Diagram => "diagram",
            Self::User => "user",
            Self::Team => "team",
            Self::Actor => "actor",
            Self::ExternalSystem => "external-system",
            Self::Visualizer => "visualizer",
        }
    }
}

impl std::fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named resource definition with its body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub kind: DefinitionKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Body::is_empty")]
    pub body: Body,
}

impl Definition {
    pub fn new(kind: DefinitionKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            body: Body::default(),
        }
    }

    /// Append a statement (builder style)
    pub fn with(mut self, stmt: Statement) -> Self {
        self.body.0.push(stmt);
        self
    }

    /// Append a nested definition (builder style)
    pub fn nest(self, def: Definition) -> Self {
        self.with(Statement::Definition(Box::new(def)))
    }

    /// Declared version, if any
    pub fn version(&self) -> Option<&str> {
        self.body.version()
    }

    /// Display label: the `name` statement, else the identifier
    pub fn label(&self) -> &str {
        self.body.display_name().unwrap_or(&self.name)
    }
}

// ============================================================================
// References
// ============================================================================

/// `Name` or `Name@version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ResourceRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn versioned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Split `Name@1.0.0` into name and version
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('@') {
            Some((name, version)) if !version.is_empty() => Self::versioned(name, version),
            _ => Self::new(raw.trim_end_matches('@')),
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}@{}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

/// Message flavour used by sends/receives and data-product inputs/outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    Event,
    Command,
    Query,
}

impl MessageKind {
    pub fn definition_kind(self) -> DefinitionKind {
        match self {
            Self::Event => DefinitionKind::Event,
            Self::Command => DefinitionKind::Command,
            Self::Query => DefinitionKind::Query,
        }
    }
}

/// `sends event X@1.0.0 to ChannelA { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStmt {
    pub message_type: MessageKind,
    pub message_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_clause: Option<ChannelClause>,
    #[serde(default, skip_serializing_if = "Body::is_empty")]
    pub body: Body,
}

impl MessageStmt {
    pub fn new(message_type: MessageKind, message_name: impl Into<String>) -> Self {
        Self {
            message_type,
            message_name: message_name.into(),
            version: None,
            channel_clause: None,
            body: Body::default(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attach a `to`/`from` clause; `Name@1.0.0` strings are split
    pub fn via<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.channel_clause = Some(ChannelClause::of(channels));
        self
    }

    pub fn with(mut self, stmt: Statement) -> Self {
        self.body.0.push(stmt);
        self
    }

    /// Version from the statement itself, else from its inline body
    pub fn effective_version(&self) -> Option<&str> {
        self.version.as_deref().or_else(|| self.body.version())
    }

    /// Every channel named by the clause and by body-level `to`/`from`
    pub fn channels(&self) -> Vec<&ResourceRef> {
        let mut out: Vec<&ResourceRef> = Vec::new();
        if let Some(clause) = &self.channel_clause {
            out.extend(clause.channels.iter());
        }
        if let Some(clause) = self.body.to_clause() {
            out.extend(clause.channels.iter());
        }
        if let Some(clause) = self.body.from_clause() {
            out.extend(clause.channels.iter());
        }
        out
    }
}

/// Channel list of a `to` / `from` clause
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelClause {
    pub channels: Vec<ResourceRef>,
}

impl ChannelClause {
    pub fn of<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            channels: channels
                .into_iter()
                .map(|c| ResourceRef::parse(c.as_ref()))
                .collect(),
        }
    }
}

/// `@note("text", author: "x")`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub args: Vec<AnnotationArg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationArg {
    Positional(String),
    Named { key: String, value: String },
}

/// Data-product `input` / `output`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageIo {
    pub message_type: MessageKind,
    #[serde(rename = "ref")]
    pub reference: ResourceRef,
}

/// A step name inside a flow, with an optional edge label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStepRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FlowStepRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
        }
    }

    pub fn labeled(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
        }
    }
}

/// `A, B -> C "label" -> D`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowChain {
    pub sources: Vec<FlowStepRef>,
    #[serde(default)]
    pub targets: Vec<FlowStepRef>,
}

/// `when A and B { C -> "ok": D }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhenBlock {
    pub triggers: Vec<FlowStepRef>,
    #[serde(default)]
    pub actions: Vec<FlowAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAction {
    #[serde(rename = "ref")]
    pub step: FlowStepRef,
    #[serde(default)]
    pub outputs: Vec<FlowOutput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub target: FlowStepRef,
}

/// `owns service OrderService`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnsRef {
    pub resource_type: DefinitionKind,
    pub name: String,
}

/// One statement inside a definition body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Statement {
    // Common properties
    Version(String),
    Name(String),
    Summary(String),
    Owner(String),
    Deprecated(bool),
    Draft(bool),
    Schema(String),
    Annotation(Annotation),

    // Nesting
    Definition(Box<Definition>),
    ServiceRef(ResourceRef),
    DomainRef(ResourceRef),
    ChannelRef(ResourceRef),
    ContainerRef(ResourceRef),
    FlowRef(ResourceRef),
    DataProductRef(ResourceRef),

    // Messaging
    Sends(MessageStmt),
    Receives(MessageStmt),
    To(ChannelClause),
    From(ChannelClause),

    // Data access
    WritesTo(ResourceRef),
    ReadsFrom(ResourceRef),

    // Channel
    Address(String),
    Protocol(String),
    Route(ResourceRef),

    // Container
    ContainerType(String),
    Technology(String),
    Authoritative(bool),
    AccessMode(String),
    Classification(String),
    Residency(String),
    Retention(String),

    // Data product
    Input(MessageIo),
    Output(MessageIo),

    // Flow
    FlowChain(FlowChain),
    When(WhenBlock),

    // User / team
    Role(String),
    Email(String),
    Team(String),
    Member(String),
    Owns(OwnsRef),

    // View display options
    Legend(bool),
    Search(bool),
    Toolbar(bool),
    FocusMode(bool),
    Animated(bool),
    Style(String),
}

impl Statement {
    pub fn version(v: impl Into<String>) -> Self {
        Self::Version(v.into())
    }

    pub fn name(v: impl Into<String>) -> Self {
        Self::Name(v.into())
    }

    pub fn summary(v: impl Into<String>) -> Self {
        Self::Summary(v.into())
    }

    pub fn note(content: impl Into<String>) -> Self {
        Self::Annotation(Annotation {
            name: "note".to_string(),
            args: vec![AnnotationArg::Positional(content.into())],
        })
    }
}

// ============================================================================
// Body accessors
// ============================================================================

/// Ordered statements of a definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Body(pub Vec<Statement>);

impl Body {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.0.iter()
    }

    fn first<'a, T: 'a>(&'a self, pick: impl Fn(&'a Statement) -> Option<T>) -> Option<T> {
        self.0.iter().find_map(pick)
    }

    fn all<'a, T: 'a>(&'a self, pick: impl Fn(&'a Statement) -> Option<T>) -> Vec<T> {
        self.0.iter().filter_map(pick).collect()
    }

    pub fn version(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Version(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn display_name(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Name(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn summary(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Summary(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn owners(&self) -> Vec<String> {
        self.all(|s| match s {
            Statement::Owner(v) => Some(v.clone()),
            _ => None,
        })
    }

    pub fn deprecated(&self) -> Option<bool> {
        self.first(|s| match s {
            Statement::Deprecated(v) => Some(*v),
            _ => None,
        })
    }

    pub fn draft(&self) -> Option<bool> {
        self.first(|s| match s {
            Statement::Draft(v) => Some(*v),
            _ => None,
        })
    }

    pub fn schema(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Schema(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn annotations(&self) -> Vec<&Annotation> {
        self.all(|s| match s {
            Statement::Annotation(a) => Some(a),
            _ => None,
        })
    }

    /// Inline nested definitions of one kind
    pub fn definitions(&self, kind: DefinitionKind) -> Vec<&Definition> {
        self.all(|s| match s {
            Statement::Definition(d) if d.kind == kind => Some(d.as_ref()),
            _ => None,
        })
    }

    pub fn service_refs(&self) -> Vec<&ResourceRef> {
        self.all(|s| match s {
            Statement::ServiceRef(r) => Some(r),
            _ => None,
        })
    }

    pub fn container_refs(&self) -> Vec<&ResourceRef> {
        self.all(|s| match s {
            Statement::ContainerRef(r) => Some(r),
            _ => None,
        })
    }

    pub fn flow_refs(&self) -> Vec<&ResourceRef> {
        self.all(|s| match s {
            Statement::FlowRef(r) => Some(r),
            _ => None,
        })
    }

    pub fn data_product_refs(&self) -> Vec<&ResourceRef> {
        self.all(|s| match s {
            Statement::DataProductRef(r) => Some(r),
            _ => None,
        })
    }

    pub fn channel_refs(&self) -> Vec<&ResourceRef> {
        self.all(|s| match s {
            Statement::ChannelRef(r) => Some(r),
            _ => None,
        })
    }

    pub fn sends(&self) -> Vec<&MessageStmt> {
        self.all(|s| match s {
            Statement::Sends(m) => Some(m),
            _ => None,
        })
    }

    pub fn receives(&self) -> Vec<&MessageStmt> {
        self.all(|s| match s {
            Statement::Receives(m) => Some(m),
            _ => None,
        })
    }

    pub fn to_clause(&self) -> Option<&ChannelClause> {
        self.first(|s| match s {
            Statement::To(c) => Some(c),
            _ => None,
        })
    }

    pub fn from_clause(&self) -> Option<&ChannelClause> {
        self.first(|s| match s {
            Statement::From(c) => Some(c),
            _ => None,
        })
    }

    pub fn writes_to(&self) -> Vec<&ResourceRef> {
        self.all(|s| match s {
            Statement::WritesTo(r) => Some(r),
            _ => None,
        })
    }

    pub fn reads_from(&self) -> Vec<&ResourceRef> {
        self.all(|s| match s {
            Statement::ReadsFrom(r) => Some(r),
            _ => None,
        })
    }

    pub fn address(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Address(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn protocols(&self) -> Vec<String> {
        self.all(|s| match s {
            Statement::Protocol(v) => Some(v.clone()),
            _ => None,
        })
    }

    pub fn routes(&self) -> Vec<&ResourceRef> {
        self.all(|s| match s {
            Statement::Route(r) => Some(r),
            _ => None,
        })
    }

    pub fn container_type(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::ContainerType(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn technology(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Technology(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn authoritative(&self) -> Option<bool> {
        self.first(|s| match s {
            Statement::Authoritative(v) => Some(*v),
            _ => None,
        })
    }

    pub fn access_mode(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::AccessMode(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn classification(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Classification(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn residency(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Residency(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn retention(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Retention(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn inputs(&self) -> Vec<&MessageIo> {
        self.all(|s| match s {
            Statement::Input(io) => Some(io),
            _ => None,
        })
    }

    pub fn outputs(&self) -> Vec<&MessageIo> {
        self.all(|s| match s {
            Statement::Output(io) => Some(io),
            _ => None,
        })
    }

    pub fn flow_chains(&self) -> Vec<&FlowChain> {
        self.all(|s| match s {
            Statement::FlowChain(c) => Some(c),
            _ => None,
        })
    }

    pub fn when_blocks(&self) -> Vec<&WhenBlock> {
        self.all(|s| match s {
            Statement::When(w) => Some(w),
            _ => None,
        })
    }

    pub fn role(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Role(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn email(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Email(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn team(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Team(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn members(&self) -> Vec<&str> {
        self.all(|s| match s {
            Statement::Member(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn owns(&self) -> Vec<&OwnsRef> {
        self.all(|s| match s {
            Statement::Owns(o) => Some(o),
            _ => None,
        })
    }

    pub fn legend(&self) -> Option<bool> {
        self.first(|s| match s {
            Statement::Legend(v) => Some(*v),
            _ => None,
        })
    }

    pub fn search(&self) -> Option<bool> {
        self.first(|s| match s {
            Statement::Search(v) => Some(*v),
            _ => None,
        })
    }

    pub fn toolbar(&self) -> Option<bool> {
        self.first(|s| match s {
            Statement::Toolbar(v) => Some(*v),
            _ => None,
        })
    }

    pub fn focus_mode(&self) -> Option<bool> {
        self.first(|s| match s {
            Statement::FocusMode(v) => Some(*v),
            _ => None,
        })
    }

    pub fn animated(&self) -> Option<bool> {
        self.first(|s| match s {
            Statement::Animated(v) => Some(*v),
            _ => None,
        })
    }

    pub fn style(&self) -> Option<&str> {
        self.first(|s| match s {
            Statement::Style(v) => Some(v.as_str()),
            _ => None,
        })
    }
}

impl From<Vec<Statement>> for Body {
    fn from(stmts: Vec<Statement>) -> Self {
        Self(stmts)
    }
}
