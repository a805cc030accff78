//! Storage-set acceptance predicate
//!
//! Weight-aware check that a candidate storage set can actually satisfy a
//! replication property. The selector fails closed on rejection rather
//! than installing a set that silently violates the replication contract.

use logtide_common::{ClusterConfig, NodeLocationScope, ReplicationProperty, StorageSet};
use std::collections::BTreeSet;

/// Whether `set` can host `replication` given current node weights
///
/// Every member must be a known node. The positively weighted members must
/// span at least `replication_factor` distinct domains at the sync
/// replication scope; at `Node` scope (and the unconstrained `Root`
/// sentinel) distinct positively weighted nodes suffice. Members at a
/// constraining scope must carry a location specifying that scope.
#[must_use]
pub fn valid_storage_set(
    cluster: &ClusterConfig,
    set: &StorageSet,
    replication: &ReplicationProperty,
) -> bool {
    let (scope, factor) = replication.reduce();
    let constrained =
        scope != NodeLocationScope::Node && scope != NodeLocationScope::Root;

    let mut writable_nodes = 0usize;
    let mut writable_domains = BTreeSet::new();
    for index in set.iter() {
        let Some(node) = cluster.node(index) else {
            return false;
        };
        if node.weight <= 0.0 {
            continue;
        }
        writable_nodes += 1;
        if constrained {
            let Some(location) = &node.location else {
                return false;
            };
            if !location.scope_specified(scope) {
                return false;
            }
            writable_domains.insert(location.domain(scope));
        }
    }

    if constrained {
        writable_domains.len() >= factor
    } else {
        writable_nodes >= factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logtide_common::{NodeIndex, StorageNode};

    fn rack_node(rack: &str, weight: f64) -> StorageNode {
        StorageNode::new("10.0.0.1:4440")
            .with_location(format!("ash.dc1.cl1.row1.{rack}").parse().unwrap())
            .with_weight(weight)
    }

    fn replication(scope: NodeLocationScope, factor: usize) -> ReplicationProperty {
        ReplicationProperty::new(scope, factor).unwrap()
    }

    #[test]
    fn test_accepts_spanning_set() {
        let mut cluster = ClusterConfig::new();
        cluster.insert_node(NodeIndex::new(1), rack_node("rk1", 1.0));
        cluster.insert_node(NodeIndex::new(2), rack_node("rk2", 1.0));
        cluster.insert_node(NodeIndex::new(3), rack_node("rk3", 0.0));

        let set = StorageSet::from_unsorted(vec![
            NodeIndex::new(1),
            NodeIndex::new(2),
            NodeIndex::new(3),
        ]);
        assert!(valid_storage_set(
            &cluster,
            &set,
            &replication(NodeLocationScope::Rack, 2)
        ));
    }

    #[test]
    fn test_rejects_zero_weight_starvation() {
        let mut cluster = ClusterConfig::new();
        cluster.insert_node(NodeIndex::new(1), rack_node("rk1", 1.0));
        cluster.insert_node(NodeIndex::new(2), rack_node("rk1", 1.0));
        cluster.insert_node(NodeIndex::new(3), rack_node("rk2", 0.0));
        cluster.insert_node(NodeIndex::new(4), rack_node("rk2", 0.0));

        // Two racks, but every writable node sits in rk1.
        let set = StorageSet::from_unsorted(vec![
            NodeIndex::new(1),
            NodeIndex::new(2),
            NodeIndex::new(3),
            NodeIndex::new(4),
        ]);
        assert!(!valid_storage_set(
            &cluster,
            &set,
            &replication(NodeLocationScope::Rack, 2)
        ));
    }

    #[test]
    fn test_rejects_unknown_member() {
        let mut cluster = ClusterConfig::new();
        cluster.insert_node(NodeIndex::new(1), rack_node("rk1", 1.0));

        let set = StorageSet::from_unsorted(vec![NodeIndex::new(1), NodeIndex::new(99)]);
        assert!(!valid_storage_set(
            &cluster,
            &set,
            &replication(NodeLocationScope::Rack, 1)
        ));
    }

    #[test]
    fn test_node_scope_counts_writable_nodes() {
        let mut cluster = ClusterConfig::new();
        // No locations at all; node-scope replication does not need them.
        cluster.insert_node(NodeIndex::new(1), StorageNode::new("10.0.0.1:4440"));
        cluster.insert_node(NodeIndex::new(2), StorageNode::new("10.0.0.2:4440"));
        cluster.insert_node(
            NodeIndex::new(3),
            StorageNode::new("10.0.0.3:4440").with_weight(0.0),
        );

        let set = StorageSet::from_unsorted(vec![
            NodeIndex::new(1),
            NodeIndex::new(2),
            NodeIndex::new(3),
        ]);
        assert!(valid_storage_set(
            &cluster,
            &set,
            &replication(NodeLocationScope::Node, 2)
        ));
        assert!(!valid_storage_set(
            &cluster,
            &set,
            &replication(NodeLocationScope::Node, 3)
        ));
    }
}
