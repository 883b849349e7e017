//! Post-walk normalization of the node/edge store

use tracing::debug;

use crate::graph::{EdgeType, NodeIdx, NodeStore};

/// Drop receives-side message→channel shortcuts whose channel is reachable
/// from the message without them.
///
/// Shortcuts are checked in insertion order against the current edge set,
/// so of two mutually redundant shortcuts only one is removed.
pub fn prune_shortcuts(store: &mut NodeStore, shortcuts: &[(NodeIdx, NodeIdx)]) {
    for &(msg, channel) in shortcuts {
        if store.has_edge(msg, EdgeType::RoutesTo, channel)
            && store.reaches(msg, channel, EdgeType::RoutesTo, true)
        {
            debug!(
                message = %store.node(msg).id(),
                channel = %store.node(channel).id(),
                "pruning redundant route"
            );
            store.remove_edge(msg, EdgeType::RoutesTo, channel);
        }
    }
}

/// Collapse `service ─writes-to─► container` plus
/// `container ─reads-from─► service` into one `service ─reads-writes─► container`.
pub fn merge_read_write(store: &mut NodeStore) {
    for (service, container) in store.edges_of_type(EdgeType::WritesTo) {
        if !store.has_edge(container, EdgeType::ReadsFrom, service) {
            continue;
        }
        debug!(
            service = %store.node(service).id(),
            container = %store.node(container).id(),
            "merging read/write access"
        );
        store.remove_edge(service, EdgeType::WritesTo, container);
        store.remove_edge(container, EdgeType::ReadsFrom, service);
        store.add_edge(service, container, EdgeType::ReadsWrites, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeMetadata, NodeType};

    fn add(store: &mut NodeStore, name: &str, node_type: NodeType) -> NodeIdx {
        store.add_or_upgrade(name, node_type, name, None, NodeMetadata::default())
    }

    #[test]
    fn test_merge_only_matching_pairs() {
        let mut store = NodeStore::new();
        let svc = add(&mut store, "S", NodeType::Service);
        let db = add(&mut store, "db", NodeType::Container);
        let cache = add(&mut store, "cache", NodeType::Container);
        store.add_edge(svc, db, EdgeType::WritesTo, None);
        store.add_edge(db, svc, EdgeType::ReadsFrom, None);
        store.add_edge(svc, cache, EdgeType::WritesTo, None);

        merge_read_write(&mut store);

        assert!(store.has_edge(svc, EdgeType::ReadsWrites, db));
        assert!(!store.has_edge(svc, EdgeType::WritesTo, db));
        assert!(!store.has_edge(db, EdgeType::ReadsFrom, svc));
        assert!(store.has_edge(svc, EdgeType::WritesTo, cache));
    }

    #[test]
    fn test_prune_keeps_connectivity() {
        let mut store = NodeStore::new();
        let msg = add(&mut store, "M", NodeType::Event);
        let a = add(&mut store, "A", NodeType::Channel);
        let b = add(&mut store, "B", NodeType::Channel);
        store.add_edge(msg, a, EdgeType::RoutesTo, None);
        store.add_edge(msg, b, EdgeType::RoutesTo, None);
        store.add_edge(a, b, EdgeType::RoutesTo, None);

        prune_shortcuts(&mut store, &[(msg, a), (msg, b)]);

        assert!(store.has_edge(msg, EdgeType::RoutesTo, a));
        assert!(!store.has_edge(msg, EdgeType::RoutesTo, b));
        assert!(store.reaches(msg, b, EdgeType::RoutesTo, false));
    }
}
