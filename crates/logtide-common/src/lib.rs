//! Logtide Common - Shared types and configuration
//!
//! This crate provides the foundation types used across all Logtide
//! components: node and log identifiers, hierarchical node locations,
//! replication properties, and the read-only configuration snapshot the
//! placement layers consume.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ClusterConfig, Configuration, LogGroup, LogsConfig, StorageNode};
pub use error::{Error, ErrorKind, Result};
pub use types::*;
