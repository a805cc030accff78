//! Configuration snapshot types for Logtide
//!
//! The placement layers consume these as a read-only snapshot; loading,
//! parsing, and validation happen in the configuration service.

use crate::types::{LogId, NodeIndex, NodeLocation, ReplicationProperty};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single storage node as described by the cluster configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageNode {
    /// Address the node serves its storage protocol on
    pub address: String,
    /// Hierarchical location; absent when the operator never tagged the node
    #[serde(default)]
    pub location: Option<NodeLocation>,
    /// Whether the node may appear in newly generated storage sets
    #[serde(default = "default_include")]
    pub include_in_nodesets: bool,
    /// Placement weight; zero keeps the node as a fallback only
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_include() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

impl StorageNode {
    /// Create a node with default nodeset membership and weight
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            location: None,
            include_in_nodesets: true,
            weight: 1.0,
        }
    }

    /// Set the node's location
    #[must_use]
    pub fn with_location(mut self, location: NodeLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the node's placement weight
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Mark the node as not a storage-set candidate
    #[must_use]
    pub fn excluded_from_nodesets(mut self) -> Self {
        self.include_in_nodesets = false;
        self
    }
}

/// Storage-node section of the cluster configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    nodes: BTreeMap<NodeIndex, StorageNode>,
}

impl ClusterConfig {
    /// Create an empty cluster configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerate nodes in ascending index order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &StorageNode)> {
        self.nodes.iter().map(|(index, node)| (*index, node))
    }

    /// Look up a node by index
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&StorageNode> {
        self.nodes.get(&index)
    }

    /// Add or replace a node
    pub fn insert_node(&mut self, index: NodeIndex, node: StorageNode) {
        self.nodes.insert(index, node);
    }

    /// Total number of nodes in the cluster
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the cluster has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes currently eligible for storage-set membership
    #[must_use]
    pub fn nodeset_capacity(&self) -> usize {
        self.nodes
            .values()
            .filter(|node| node.include_in_nodesets)
            .count()
    }
}

/// Attributes of a log group relevant to storage-set selection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogGroup {
    /// Replication requirement for records of this log
    pub replication: ReplicationProperty,
    /// Operator-requested storage-set size; `None` lets the selector decide
    #[serde(default)]
    pub nodeset_size: Option<usize>,
}

/// Log-group section of the configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LogsConfig {
    groups: BTreeMap<LogId, LogGroup>,
}

impl LogsConfig {
    /// Create an empty logs configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a log group by log id
    #[must_use]
    pub fn log_group(&self, log_id: LogId) -> Option<&LogGroup> {
        self.groups.get(&log_id)
    }

    /// Add or replace a log group
    pub fn insert_group(&mut self, log_id: LogId, group: LogGroup) {
        self.groups.insert(log_id, group);
    }
}

/// Complete configuration snapshot consumed by the placement layers
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Configuration {
    /// Storage nodes
    pub cluster: ClusterConfig,
    /// Log groups
    pub logs: LogsConfig,
}
