//! Type-specific processors
//!
//! One procedure per definition kind. Each emits the definition's node,
//! recurses into nested scopes, and emits the edges its body declares.
//! `parent` is the enclosing domain/subdomain node, if any.

use tracing::{debug, warn};

use super::GraphBuilder;
use crate::ast::{Definition, DefinitionKind, FlowStepRef, OwnsRef};
use crate::graph::{EdgeType, NodeIdx, NodeMetadata, NodeType};

impl<'a> GraphBuilder<'a> {
    pub(super) fn process_definition(&mut self, def: &'a Definition, parent: Option<NodeIdx>) {
        match def.kind {
            DefinitionKind::Domain | DefinitionKind::Subdomain => {
                self.process_domain(def, parent);
            }
            DefinitionKind::Service => {
                self.process_service(def, parent);
            }
            DefinitionKind::Event | DefinitionKind::Command | DefinitionKind::Query => {
                self.process_message(def);
            }
            DefinitionKind::Channel => {
                self.process_channel(def, parent);
            }
            DefinitionKind::Container => {
                self.process_container(def, parent);
            }
            DefinitionKind::DataProduct => self.process_data_product(def, parent),
            DefinitionKind::Flow => self.process_flow(def, parent),
            DefinitionKind::User => {
                self.process_user(def);
            }
            DefinitionKind::Team => {
                self.process_team(def);
            }
            DefinitionKind::Diagram | DefinitionKind::Actor | DefinitionKind::ExternalSystem => {
                self.add_definition_node(def, parent);
            }
            DefinitionKind::Visualizer => {
                warn!(view = %def.name, "ignoring view nested inside another definition");
            }
        }
    }

    /// Emit the node for a definition itself, with a `contains` edge from
    /// `parent` when given
    fn add_definition_node(&mut self, def: &'a Definition, parent: Option<NodeIdx>) -> NodeIdx {
        let node_type = NodeType::for_kind(def.kind).unwrap_or(NodeType::Step);
        let idx = self.store.add_or_upgrade(
            &def.name,
            node_type,
            def.label(),
            parent,
            NodeMetadata::from_definition(def),
        );
        self.attach(parent, idx);
        idx
    }

    // ========================================================================
    // Domain / subdomain
    // ========================================================================

    pub(super) fn process_domain(&mut self, def: &'a Definition, parent: Option<NodeIdx>) -> NodeIdx {
        let body = &def.body;
        let domain = self.add_definition_node(def, parent);

        for svc in body.definitions(DefinitionKind::Service) {
            self.process_service(svc, Some(domain));
        }

        for reference in body.service_refs() {
            match self
                .index
                .lookup_node(&reference.name, reference.version(), NodeType::Service)
            {
                Some(svc) => {
                    self.process_service(svc, Some(domain));
                }
                None => {
                    let svc = self.resolve_or_create(
                        &reference.name,
                        NodeType::Service,
                        reference.version(),
                        Some(domain),
                    );
                    self.attach(Some(domain), svc);
                }
            }
        }

        for container in body.definitions(DefinitionKind::Container) {
            self.process_container(container, Some(domain));
        }

        for channel in body.definitions(DefinitionKind::Channel) {
            self.process_channel(channel, Some(domain));
        }

        for sub in body.definitions(DefinitionKind::Subdomain) {
            self.process_domain(sub, Some(domain));
        }

        let references = [
            (body.flow_refs(), NodeType::Flow),
            (body.data_product_refs(), NodeType::DataProduct),
            (body.container_refs(), NodeType::Container),
        ];
        for (refs, node_type) in references {
            for reference in refs {
                let idx = self.resolve_or_create(
                    &reference.name,
                    node_type,
                    reference.version(),
                    Some(domain),
                );
                self.attach(Some(domain), idx);
            }
        }

        // Domain-level messaging has no enclosing scope of its own.
        self.process_sends(domain, body.sends(), None);
        self.process_receives(domain, body.receives(), None);

        domain
    }

    // ========================================================================
    // Service
    // ========================================================================

    pub(super) fn process_service(&mut self, def: &'a Definition, parent: Option<NodeIdx>) -> NodeIdx {
        let body = &def.body;
        let svc = self.add_definition_node(def, parent);

        self.process_sends(svc, body.sends(), parent);
        self.process_receives(svc, body.receives(), parent);

        for reference in body.writes_to() {
            let container =
                self.resolve_or_create(&reference.name, NodeType::Container, reference.version(), None);
            self.store.add_edge(svc, container, EdgeType::WritesTo, None);
        }

        for reference in body.reads_from() {
            let container =
                self.resolve_or_create(&reference.name, NodeType::Container, reference.version(), None);
            self.store.add_edge(container, svc, EdgeType::ReadsFrom, None);
        }

        svc
    }

    // ========================================================================
    // Messages, channels, containers
    // ========================================================================

    pub(super) fn process_message(&mut self, def: &'a Definition) -> NodeIdx {
        let msg = self.add_definition_node(def, None);
        for reference in def.body.channel_refs() {
            self.resolve_or_create(&reference.name, NodeType::Channel, reference.version(), None);
        }
        msg
    }

    pub(super) fn process_channel(&mut self, def: &'a Definition, parent: Option<NodeIdx>) -> NodeIdx {
        let channel = self.add_definition_node(def, parent);
        self.process_routes(channel, def.body.routes());
        channel
    }

    pub(super) fn process_container(&mut self, def: &'a Definition, parent: Option<NodeIdx>) -> NodeIdx {
        self.add_definition_node(def, parent)
    }

    // ========================================================================
    // Data product
    // ========================================================================

    fn process_data_product(&mut self, def: &'a Definition, parent: Option<NodeIdx>) {
        let product = self.add_definition_node(def, parent);

        for input in def.body.inputs() {
            let msg = self.resolve_io_message(
                &input.reference.name,
                NodeType::from(input.message_type),
                input.reference.version(),
            );
            self.store.add_edge(msg, product, EdgeType::Sends, None);
        }

        for output in def.body.outputs() {
            let msg = self.resolve_io_message(
                &output.reference.name,
                NodeType::from(output.message_type),
                output.reference.version(),
            );
            self.store.add_edge(product, msg, EdgeType::Sends, None);
        }
    }

    /// Reuse a message node of any flavour already in the graph, otherwise
    /// create one of the declared flavour.
    fn resolve_io_message(
        &mut self,
        name: &str,
        declared: NodeType,
        version: Option<&str>,
    ) -> NodeIdx {
        let existing = [declared, NodeType::Event, NodeType::Command, NodeType::Query]
            .into_iter()
            .find_map(|node_type| self.store.resolve(name, node_type, version));
        match existing {
            Some(idx) => idx,
            None => self.resolve_or_create(name, declared, version, None),
        }
    }

    // ========================================================================
    // Flow
    // ========================================================================

    fn process_flow(&mut self, def: &'a Definition, parent: Option<NodeIdx>) {
        let chains = def.body.flow_chains();
        let when_blocks = def.body.when_blocks();

        if chains.is_empty() && when_blocks.is_empty() {
            self.add_definition_node(def, parent);
            return;
        }

        debug!(flow = %def.name, chains = chains.len(), when_blocks = when_blocks.len(), "expanding flow");

        for chain in chains {
            let sources: Vec<NodeIdx> = chain.sources.iter().map(|s| self.resolve_step(s)).collect();
            let targets: Vec<NodeIdx> = chain.targets.iter().map(|t| self.resolve_step(t)).collect();

            if let Some(&first) = targets.first() {
                for (source_ref, &source) in chain.sources.iter().zip(&sources) {
                    self.store
                        .add_edge(source, first, EdgeType::FlowStep, source_ref.label.as_deref());
                }
            }
            for (i, pair) in targets.windows(2).enumerate() {
                self.store.add_edge(
                    pair[0],
                    pair[1],
                    EdgeType::FlowStep,
                    chain.targets[i].label.as_deref(),
                );
            }
        }

        for block in when_blocks {
            let triggers: Vec<NodeIdx> = block.triggers.iter().map(|t| self.resolve_step(t)).collect();
            for action in &block.actions {
                let action_idx = self.resolve_step(&action.step);
                for &trigger in &triggers {
                    self.store.add_edge(
                        trigger,
                        action_idx,
                        EdgeType::FlowStep,
                        action.step.label.as_deref(),
                    );
                }
                for output in &action.outputs {
                    let target = self.resolve_step(&output.target);
                    self.store
                        .add_edge(action_idx, target, EdgeType::FlowStep, output.label.as_deref());
                }
            }
        }
    }

    fn resolve_step(&mut self, step: &FlowStepRef) -> NodeIdx {
        let node_type = self.infer_step_type(&step.name);
        self.resolve_or_create(&step.name, node_type, None, None)
    }

    /// Index first, then nodes already in the graph, then `step`
    fn infer_step_type(&self, name: &str) -> NodeType {
        self.index
            .infer_node_type(name)
            .or_else(|| self.store.first_named(name).map(|n| n.node_type()))
            .unwrap_or(NodeType::Step)
    }

    // ========================================================================
    // Users & teams
    // ========================================================================

    fn process_user(&mut self, def: &'a Definition) -> NodeIdx {
        let user = self.add_definition_node(def, None);
        self.add_ownership(user, def.body.owns());
        if let Some(team) = def.body.team() {
            let team = self.resolve_or_create(team, NodeType::Team, None, None);
            self.store.add_edge(user, team, EdgeType::MemberOf, None);
        }
        user
    }

    fn process_team(&mut self, def: &'a Definition) -> NodeIdx {
        let team = self.add_definition_node(def, None);
        for member in def.body.members() {
            let user = self.resolve_or_create(member, NodeType::User, None, None);
            self.store.add_edge(user, team, EdgeType::MemberOf, None);
        }
        self.add_ownership(team, def.body.owns());
        team
    }

    fn add_ownership(&mut self, owner: NodeIdx, owns: Vec<&'a OwnsRef>) {
        for owned in owns {
            let Some(node_type) = NodeType::for_kind(owned.resource_type) else {
                warn!(name = %owned.name, kind = %owned.resource_type, "cannot own this kind of resource");
                continue;
            };
            let target = self.resolve_or_create(&owned.name, node_type, None, None);
            self.store.add_edge(owner, target, EdgeType::Owns, None);
        }
    }
}
