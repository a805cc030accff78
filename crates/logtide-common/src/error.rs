//! Error types for Logtide
//!
//! This module defines the common error types used throughout the system.

use crate::types::{LocationParseError, LogId, NodeIndex, NodeLocationScope, ReplicationPropertyError};
use thiserror::Error;

/// Common result type for Logtide operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for Logtide
#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("invalid node location: {0}")]
    InvalidLocation(#[from] LocationParseError),

    #[error("invalid replication property: {0}")]
    InvalidReplication(#[from] ReplicationPropertyError),

    #[error("node {node} has no location assigned")]
    MissingLocation { node: NodeIndex },

    #[error("location of node {node} does not specify scope {scope}: {location:?}")]
    ScopeNotSpecified {
        node: NodeIndex,
        scope: NodeLocationScope,
        location: String,
    },

    // Selection errors
    #[error("log group not found: {0}")]
    LogNotFound(LogId),

    #[error("replication scope {0} cannot constrain storage-set selection")]
    InvalidScope(NodeLocationScope),

    #[error("no failure domains with nodeset-eligible storage nodes")]
    NoEligibleDomains,

    #[error("domain {domain:?} has {available} eligible nodes, need {required}")]
    NotEnoughInDomain {
        domain: String,
        available: usize,
        required: usize,
    },

    #[error("insufficient nodes for storage set: have {available}, need {required}")]
    NotEnoughNodes { available: usize, required: usize },

    #[error("selected storage set cannot satisfy the replication property given node weights")]
    InvalidWeights,
}

/// Coarse tag for an [`Error`]
///
/// Used by the legacy thread-local error slot, which callers migrating from
/// the old calling convention still read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidLocation,
    InvalidReplication,
    MissingLocation,
    ScopeNotSpecified,
    LogNotFound,
    InvalidScope,
    NoEligibleDomains,
    NotEnoughInDomain,
    NotEnoughNodes,
    InvalidWeights,
}

impl Error {
    /// Get the coarse tag for this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidLocation(_) => ErrorKind::InvalidLocation,
            Self::InvalidReplication(_) => ErrorKind::InvalidReplication,
            Self::MissingLocation { .. } => ErrorKind::MissingLocation,
            Self::ScopeNotSpecified { .. } => ErrorKind::ScopeNotSpecified,
            Self::LogNotFound(_) => ErrorKind::LogNotFound,
            Self::InvalidScope(_) => ErrorKind::InvalidScope,
            Self::NoEligibleDomains => ErrorKind::NoEligibleDomains,
            Self::NotEnoughInDomain { .. } => ErrorKind::NotEnoughInDomain,
            Self::NotEnoughNodes { .. } => ErrorKind::NotEnoughNodes,
            Self::InvalidWeights => ErrorKind::InvalidWeights,
        }
    }

    /// Check if the operator must fix the cluster configuration
    #[must_use]
    pub const fn is_config_fault(&self) -> bool {
        matches!(
            self,
            Self::InvalidLocation(_)
                | Self::InvalidReplication(_)
                | Self::MissingLocation { .. }
                | Self::ScopeNotSpecified { .. }
        )
    }

    /// Check if the cluster lacks capacity to satisfy the request
    #[must_use]
    pub const fn is_capacity_shortfall(&self) -> bool {
        matches!(
            self,
            Self::NoEligibleDomains
                | Self::NotEnoughInDomain { .. }
                | Self::NotEnoughNodes { .. }
                | Self::InvalidWeights
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        let err = Error::MissingLocation {
            node: NodeIndex::new(3),
        };
        assert_eq!(err.kind(), ErrorKind::MissingLocation);
        assert_eq!(Error::InvalidWeights.kind(), ErrorKind::InvalidWeights);
    }

    #[test]
    fn test_error_config_fault() {
        assert!(
            Error::MissingLocation {
                node: NodeIndex::new(0)
            }
            .is_config_fault()
        );
        assert!(!Error::InvalidWeights.is_config_fault());
    }

    #[test]
    fn test_error_capacity_shortfall() {
        assert!(
            Error::NotEnoughInDomain {
                domain: "ash.dc1".to_string(),
                available: 1,
                required: 3,
            }
            .is_capacity_shortfall()
        );
        assert!(!Error::LogNotFound(LogId::new(7)).is_capacity_shortfall());
    }
}
