//! Definition index
//!
//! One pass over the document's top-level definitions, excluding views.
//! Services, containers, and channels nested inside domains (at any
//! subdomain depth) are indexed exactly like top-level ones.
//!
//! - `name@version` → that exact definition
//! - `name` → the definition carrying the highest valid semantic version;
//!   invalid or missing versions never displace a valid one, and among two
//!   invalid ones the first declaration stays

use std::collections::HashMap;

use tracing::trace;

use crate::ast::{Definition, DefinitionKind, Program};
use crate::graph::NodeType;
use crate::version;

/// Kinds a domain or subdomain contributes to the index
const NESTED_KINDS: [DefinitionKind; 3] = [
    DefinitionKind::Service,
    DefinitionKind::Container,
    DefinitionKind::Channel,
];

#[derive(Debug, Default)]
pub struct DefinitionIndex<'a> {
    latest: HashMap<&'a str, &'a Definition>,
    exact: HashMap<String, &'a Definition>,
    /// Every indexed definition per bare name, in declaration order
    by_name: HashMap<&'a str, Vec<&'a Definition>>,
}

impl<'a> DefinitionIndex<'a> {
    pub fn build(program: &'a Program) -> Self {
        let mut index = Self::default();
        for def in &program.definitions {
            if def.kind != DefinitionKind::Visualizer {
                index.insert(def);
            }
        }
        index
    }

    fn insert(&mut self, def: &'a Definition) {
        if def.kind != DefinitionKind::Subdomain {
            self.register(def);
        }

        if matches!(def.kind, DefinitionKind::Domain | DefinitionKind::Subdomain) {
            for kind in NESTED_KINDS {
                for nested in def.body.definitions(kind) {
                    self.register(nested);
                }
            }
            for sub in def.body.definitions(DefinitionKind::Subdomain) {
                self.insert(sub);
            }
        }
    }

    fn register(&mut self, def: &'a Definition) {
        let name = def.name.as_str();
        let version = def.version();

        if let Some(v) = version {
            self.exact.insert(format!("{}@{}", name, v), def);
        }

        match self.latest.get(name) {
            Some(current) if !version::supersedes(version, current.version()) => {}
            _ => {
                trace!(name, version, kind = %def.kind, "indexing as latest");
                self.latest.insert(name, def);
            }
        }

        self.by_name.entry(name).or_default().push(def);
    }

    /// Highest-versioned definition for a bare name
    pub fn latest(&self, name: &str) -> Option<&'a Definition> {
        self.latest.get(name).copied()
    }

    /// Exact `name@version` definition
    pub fn exact(&self, name: &str, version: &str) -> Option<&'a Definition> {
        self.exact.get(&format!("{}@{}", name, version)).copied()
    }

    /// Exact lookup when versioned, latest otherwise. Never falls back from
    /// a missing exact version to latest.
    pub fn lookup(&self, name: &str, version: Option<&str>) -> Option<&'a Definition> {
        match version {
            Some(v) => self.exact(name, v),
            None => self.latest(name),
        }
    }

    /// Like [`lookup`](Self::lookup), restricted to definitions of `kinds`.
    ///
    /// A channel and a domain sharing a name never answer for each other.
    pub fn lookup_kind(
        &self,
        name: &str,
        version: Option<&str>,
        kinds: &[DefinitionKind],
    ) -> Option<&'a Definition> {
        let candidates = self
            .by_name
            .get(name)?
            .iter()
            .copied()
            .filter(|d| kinds.contains(&d.kind));

        match version {
            Some(v) => candidates.filter(|d| d.version() == Some(v)).last(),
            None => candidates.fold(None, |best: Option<&'a Definition>, d| match best {
                Some(b) if !version::supersedes(d.version(), b.version()) => Some(b),
                _ => Some(d),
            }),
        }
    }

    /// Definitions whose node type is `node_type`
    pub fn lookup_node(
        &self,
        name: &str,
        version: Option<&str>,
        node_type: NodeType,
    ) -> Option<&'a Definition> {
        self.lookup_kind(name, version, kinds_for(node_type))
    }

    /// First definition of `node_type` declaring no version at all
    pub fn unversioned_node(&self, name: &str, node_type: NodeType) -> Option<&'a Definition> {
        let kinds = kinds_for(node_type);
        self.by_name
            .get(name)?
            .iter()
            .copied()
            .find(|d| kinds.contains(&d.kind) && d.version().is_none())
    }

    /// Node type of the latest definition for `name`, if indexed
    pub fn infer_node_type(&self, name: &str) -> Option<NodeType> {
        self.latest(name).and_then(|d| NodeType::for_kind(d.kind))
    }

    pub fn len(&self) -> usize {
        self.by_name.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Definition kinds that render as `node_type`
pub fn kinds_for(node_type: NodeType) -> &'static [DefinitionKind] {
    match node_type {
        NodeType::Domain => &[DefinitionKind::Domain, DefinitionKind::Subdomain],
        NodeType::Service => &[DefinitionKind::Service],
        NodeType::Event => &[DefinitionKind::Event],
        NodeType::Command => &[DefinitionKind::Command],
        NodeType::Query => &[DefinitionKind::Query],
        NodeType::Channel => &[DefinitionKind::Channel],
        NodeType::Container => &[DefinitionKind::Container],
        NodeType::DataProduct => &[DefinitionKind::DataProduct],
        NodeType::Flow => &[DefinitionKind::Flow],
        NodeType::Actor => &[DefinitionKind::Actor],
        NodeType::ExternalSystem => &[DefinitionKind::ExternalSystem],
        NodeType::User => &[DefinitionKind::User],
        NodeType::Team => &[DefinitionKind::Team],
        NodeType::Diagram => &[DefinitionKind::Diagram],
        NodeType::Step => &[],
    }
}
