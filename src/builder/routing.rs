//! Channel routing resolver
//!
//! Flattens channel-mediated delivery into graph edges:
//!
//! ```text
//!   sends M to A           Service ─sends─► M ─routes-to─► A
//!   channel A { route B }  A ─routes-to─► B
//!   receives M from B      B ─receives─► Consumer
//! ```
//!
//! On the receives side a `M ─routes-to─► B` shortcut is only added when B
//! is not already reachable from M over `routes-to` edges. Shortcuts that
//! become redundant later in the walk are pruned in `normalize`.

use tracing::trace;

use super::GraphBuilder;
use crate::ast::{MessageStmt, ResourceRef};
use crate::graph::{EdgeType, NodeIdx, NodeType};

impl<'a> GraphBuilder<'a> {
    /// `sender` may be a service or a domain. `scope` is the enclosing domain
    /// that spawned messages and channels are parented to.
    pub(super) fn process_sends(
        &mut self,
        sender: NodeIdx,
        stmts: Vec<&'a MessageStmt>,
        scope: Option<NodeIdx>,
    ) {
        for stmt in stmts {
            let msg = self.resolve_message(stmt, scope);
            self.store.add_edge(sender, msg, EdgeType::Sends, None);
            self.apply_inline_body(msg, &stmt.body);

            for channel in stmt.channels() {
                let ch = self.resolve_channel(channel, scope);
                self.store.add_edge(msg, ch, EdgeType::RoutesTo, None);
            }
        }
    }

    pub(super) fn process_receives(
        &mut self,
        receiver: NodeIdx,
        stmts: Vec<&'a MessageStmt>,
        scope: Option<NodeIdx>,
    ) {
        for stmt in stmts {
            let msg = self.resolve_message(stmt, scope);
            self.apply_inline_body(msg, &stmt.body);

            let channels = stmt.channels();
            if channels.is_empty() {
                self.store.add_edge(msg, receiver, EdgeType::Receives, None);
                continue;
            }

            // A channel mediates, so no direct message→consumer edge.
            self.store.remove_edge(msg, EdgeType::Receives, receiver);

            for channel in channels {
                let ch = self.resolve_channel(channel, scope);
                self.link_message_to_channel(msg, ch);
                self.store.add_edge(ch, receiver, EdgeType::Receives, None);
            }
        }
    }

    fn link_message_to_channel(&mut self, msg: NodeIdx, ch: NodeIdx) {
        if self.config.suppress_redundant_routes
            && self.store.reaches(msg, ch, EdgeType::RoutesTo, false)
        {
            trace!(
                message = %self.store.node(msg).id(),
                channel = %self.store.node(ch).id(),
                "channel already reachable, skipping shortcut"
            );
            return;
        }
        if self.store.add_edge(msg, ch, EdgeType::RoutesTo, None) {
            self.shortcuts.push((msg, ch));
        }
    }

    fn resolve_message(&mut self, stmt: &MessageStmt, scope: Option<NodeIdx>) -> NodeIdx {
        let msg = self.resolve_or_create(
            &stmt.message_name,
            NodeType::from(stmt.message_type),
            stmt.effective_version(),
            scope,
        );
        self.attach(scope, msg);
        msg
    }

    fn resolve_channel(&mut self, channel: &ResourceRef, scope: Option<NodeIdx>) -> NodeIdx {
        let ch = self.resolve_or_create(&channel.name, NodeType::Channel, channel.version(), scope);
        self.attach(scope, ch);
        ch
    }

    /// `route` statements of a channel declared in the view
    pub(super) fn process_routes(&mut self, channel: NodeIdx, routes: Vec<&'a ResourceRef>) {
        for route in routes {
            let target = self.resolve_or_create(&route.name, NodeType::Channel, route.version(), None);
            self.store.add_edge(channel, target, EdgeType::RoutesTo, None);
        }
    }
}
