//! Core type definitions for Logtide
//!
//! This module defines the fundamental types used throughout the system
//! including identifiers, hierarchical node locations, and replication
//! properties.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Cluster-wide index of a storage node
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    From,
    Into,
    Display,
)]
#[display("N{_0}")]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Create a node index
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Unique identifier for a log
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    From,
    Into,
    Display,
)]
#[display("{_0}")]
pub struct LogId(u64);

impl LogId {
    /// Create a log identifier
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Hierarchical failure scope ladder, finest first
///
/// `Node` is the finest scope; `Root` is a sentinel meaning "no
/// constraint". The ordering is total: a replication requirement at a
/// broader scope is strictly harder to satisfy than one at a finer scope.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NodeLocationScope {
    /// Individual storage node
    Node = 0,
    /// Rack/power domain
    Rack = 1,
    /// Row of racks
    Row = 2,
    /// Cluster within a datacenter
    Cluster = 3,
    /// Datacenter/AZ
    DataCenter = 4,
    /// Geographic region
    Region = 5,
    /// No constraint
    Root = 6,
}

impl NodeLocationScope {
    /// Slot of this scope in a location's label vector, broadest first.
    ///
    /// `Node` and `Root` have no label of their own.
    const fn label_slot(self) -> Option<usize> {
        match self {
            Self::Region => Some(0),
            Self::DataCenter => Some(1),
            Self::Cluster => Some(2),
            Self::Row => Some(3),
            Self::Rack => Some(4),
            Self::Node | Self::Root => None,
        }
    }
}

impl fmt::Display for NodeLocationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Rack => write!(f, "rack"),
            Self::Row => write!(f, "row"),
            Self::Cluster => write!(f, "cluster"),
            Self::DataCenter => write!(f, "data_center"),
            Self::Region => write!(f, "region"),
            Self::Root => write!(f, "root"),
        }
    }
}

/// Number of label slots in a node location, `Region` through `Rack`.
const NUM_LOCATION_SCOPES: usize = 5;

/// Hierarchical location of a node, broadest label first
///
/// The wire form is `region.datacenter.cluster.row.rack`. Labels may be
/// left empty from some point downward; a specified label below an
/// unspecified one is invalid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeLocation {
    labels: [String; NUM_LOCATION_SCOPES],
}

impl NodeLocation {
    /// Whether no label is specified at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels[0].is_empty()
    }

    /// Count of leading specified labels
    fn num_specified(&self) -> usize {
        self.labels.iter().take_while(|label| !label.is_empty()).count()
    }

    /// Whether the label at `scope` (and every broader label) is present
    ///
    /// Trivially true at `Root`; at `Node` the location must be fully
    /// specified.
    #[must_use]
    pub fn scope_specified(&self, scope: NodeLocationScope) -> bool {
        match scope {
            NodeLocationScope::Root => true,
            NodeLocationScope::Node => self.num_specified() == NUM_LOCATION_SCOPES,
            _ => scope
                .label_slot()
                .is_some_and(|slot| slot < self.num_specified()),
        }
    }

    /// Stable key of the failure domain this location belongs to at `scope`
    ///
    /// The key is the label prefix from the broadest scope down to `scope`,
    /// joined with `'.'`. At `Root` every node shares the empty-key domain.
    #[must_use]
    pub fn domain(&self, scope: NodeLocationScope) -> String {
        match scope.label_slot() {
            Some(slot) => self.labels[..=slot].join("."),
            None => match scope {
                NodeLocationScope::Root => String::new(),
                _ => self.labels.join("."),
            },
        }
    }
}

impl fmt::Display for NodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.labels.join("."))
    }
}

impl From<NodeLocation> for String {
    fn from(location: NodeLocation) -> Self {
        location.to_string()
    }
}

impl TryFrom<String> for NodeLocation {
    type Error = LocationParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for NodeLocation {
    type Err = LocationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != NUM_LOCATION_SCOPES {
            return Err(LocationParseError::WrongLabelCount(parts.len()));
        }
        let mut labels: [String; NUM_LOCATION_SCOPES] = Default::default();
        let mut unspecified = false;
        for (slot, part) in parts.iter().enumerate() {
            if part.is_empty() {
                unspecified = true;
            } else if unspecified {
                return Err(LocationParseError::GapInHierarchy(s.to_string()));
            } else {
                labels[slot] = (*part).to_string();
            }
        }
        Ok(Self { labels })
    }
}

/// Errors that can occur when parsing a node location string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationParseError {
    #[error("expected {NUM_LOCATION_SCOPES} '.'-separated labels, got {0}")]
    WrongLabelCount(usize),
    #[error("label specified below an unspecified scope in {0:?}")]
    GapInHierarchy(String),
}

/// Replication requirement as ordered `(scope, factor)` pairs
///
/// Only the smallest-scope entry drives storage-set selection; broader
/// entries are carried for the copyset placement layers above.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationProperty {
    scopes: BTreeMap<NodeLocationScope, usize>,
}

impl ReplicationProperty {
    /// Single-scope replication requirement
    ///
    /// # Errors
    /// `ZeroFactor` when `factor` is zero.
    pub fn new(
        scope: NodeLocationScope,
        factor: usize,
    ) -> Result<Self, ReplicationPropertyError> {
        Self::from_pairs([(scope, factor)])
    }

    /// Build from `(scope, factor)` pairs
    ///
    /// # Errors
    /// `Empty` when no pair is given, `ZeroFactor` on a zero factor,
    /// `DuplicateScope` when a scope appears twice.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (NodeLocationScope, usize)>,
    ) -> Result<Self, ReplicationPropertyError> {
        let mut scopes = BTreeMap::new();
        for (scope, factor) in pairs {
            if factor == 0 {
                return Err(ReplicationPropertyError::ZeroFactor(scope));
            }
            if scopes.insert(scope, factor).is_some() {
                return Err(ReplicationPropertyError::DuplicateScope(scope));
            }
        }
        if scopes.is_empty() {
            return Err(ReplicationPropertyError::Empty);
        }
        Ok(Self { scopes })
    }

    /// Smallest-scope entry: `(sync replication scope, replication factor)`
    #[must_use]
    pub fn reduce(&self) -> (NodeLocationScope, usize) {
        let (&scope, &factor) = self
            .scopes
            .first_key_value()
            .expect("constructors reject empty properties");
        (scope, factor)
    }

    /// Finest scope across which replicas must reside in distinct domains
    #[must_use]
    pub fn sync_scope(&self) -> NodeLocationScope {
        self.reduce().0
    }

    /// Number of replicas required for each record
    #[must_use]
    pub fn replication_factor(&self) -> usize {
        self.reduce().1
    }
}

/// Errors that can occur when building a replication property
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplicationPropertyError {
    #[error("replication property cannot be empty")]
    Empty,
    #[error("replication factor at scope {0} must be at least 1")]
    ZeroFactor(NodeLocationScope),
    #[error("scope {0} appears more than once")]
    DuplicateScope(NodeLocationScope),
}

/// Sorted set of distinct storage node indices chosen to host a log's records
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageSet(Vec<NodeIndex>);

impl StorageSet {
    /// Build from indices in arbitrary order; sorts and removes duplicates
    #[must_use]
    pub fn from_unsorted(mut indices: Vec<NodeIndex>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self(indices)
    }

    /// Number of nodes in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `index` is a member
    #[must_use]
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.0.binary_search(&index).is_ok()
    }

    /// Members in ascending order
    pub fn iter(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.0.iter().copied()
    }

    /// Members as a sorted slice
    #[must_use]
    pub fn as_slice(&self) -> &[NodeIndex] {
        &self.0
    }
}

impl fmt::Display for StorageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(s: &str) -> NodeLocation {
        s.parse().unwrap()
    }

    #[test]
    fn test_scope_ordering() {
        assert!(NodeLocationScope::Node < NodeLocationScope::Rack);
        assert!(NodeLocationScope::Rack < NodeLocationScope::Row);
        assert!(NodeLocationScope::Region < NodeLocationScope::Root);
    }

    #[test]
    fn test_location_parse_roundtrip() {
        let location = loc("ash.dc1.cl1.row8.rk22");
        assert_eq!(location.to_string(), "ash.dc1.cl1.row8.rk22");
        assert!(!location.is_empty());
        assert!(location.scope_specified(NodeLocationScope::Rack));
        assert!(location.scope_specified(NodeLocationScope::Node));
    }

    #[test]
    fn test_location_partial() {
        let location = loc("ash.dc1...");
        assert!(location.scope_specified(NodeLocationScope::DataCenter));
        assert!(!location.scope_specified(NodeLocationScope::Cluster));
        assert!(!location.scope_specified(NodeLocationScope::Rack));
        assert!(!location.scope_specified(NodeLocationScope::Node));
    }

    #[test]
    fn test_location_parse_errors() {
        assert_eq!(
            "ash.dc1".parse::<NodeLocation>(),
            Err(LocationParseError::WrongLabelCount(2))
        );
        assert!(matches!(
            "ash..cl1..".parse::<NodeLocation>(),
            Err(LocationParseError::GapInHierarchy(_))
        ));
    }

    #[test]
    fn test_location_empty() {
        let location = loc("....");
        assert!(location.is_empty());
        assert!(location.scope_specified(NodeLocationScope::Root));
        assert!(!location.scope_specified(NodeLocationScope::Region));
        assert_eq!(location, NodeLocation::default());
    }

    #[test]
    fn test_domain_prefixes() {
        let location = loc("ash.dc1.cl1.row8.rk22");
        assert_eq!(location.domain(NodeLocationScope::Region), "ash");
        assert_eq!(location.domain(NodeLocationScope::DataCenter), "ash.dc1");
        assert_eq!(
            location.domain(NodeLocationScope::Rack),
            "ash.dc1.cl1.row8.rk22"
        );
        assert_eq!(location.domain(NodeLocationScope::Root), "");
    }

    #[test]
    fn test_location_serde_as_string() {
        let location = loc("ash.dc1.cl1.row8.rk22");
        let json = serde_json::to_string(&location).unwrap();
        assert_eq!(json, "\"ash.dc1.cl1.row8.rk22\"");
        let back: NodeLocation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, location);
    }

    #[test]
    fn test_replication_reduce_smallest_scope() {
        let replication = ReplicationProperty::from_pairs([
            (NodeLocationScope::Region, 2),
            (NodeLocationScope::Rack, 3),
        ])
        .unwrap();
        assert_eq!(replication.reduce(), (NodeLocationScope::Rack, 3));
        assert_eq!(replication.sync_scope(), NodeLocationScope::Rack);
        assert_eq!(replication.replication_factor(), 3);
    }

    #[test]
    fn test_replication_validation() {
        assert_eq!(
            ReplicationProperty::new(NodeLocationScope::Rack, 0),
            Err(ReplicationPropertyError::ZeroFactor(NodeLocationScope::Rack))
        );
        assert_eq!(
            ReplicationProperty::from_pairs([]),
            Err(ReplicationPropertyError::Empty)
        );
        assert_eq!(
            ReplicationProperty::from_pairs([
                (NodeLocationScope::Rack, 2),
                (NodeLocationScope::Rack, 3),
            ]),
            Err(ReplicationPropertyError::DuplicateScope(
                NodeLocationScope::Rack
            ))
        );
    }

    #[test]
    fn test_storage_set_sorts_and_dedups() {
        let set = StorageSet::from_unsorted(vec![
            NodeIndex::new(5),
            NodeIndex::new(1),
            NodeIndex::new(5),
            NodeIndex::new(3),
        ]);
        assert_eq!(
            set.as_slice(),
            &[NodeIndex::new(1), NodeIndex::new(3), NodeIndex::new(5)]
        );
        assert!(set.contains(NodeIndex::new(3)));
        assert!(!set.contains(NodeIndex::new(2)));
        assert_eq!(set.to_string(), "{N1,N3,N5}");
    }
}
