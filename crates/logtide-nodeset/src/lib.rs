//! Logtide Nodeset - cross-domain storage-set selection
//!
//! This crate chooses, deterministically by seed, a balanced subset of
//! storage nodes (the storage set) for a log, such that placing any
//! `replication_factor` replicas into the subset can put them in distinct
//! failure domains at the log's sync replication scope.
//!
//! Selection runs as a pure function of the configuration snapshot: build
//! a map from failure domain to eligible nodes, plan a size that divides
//! evenly across domains (pruning under-populated domains when they would
//! bottleneck the result), sample each domain's quota, and validate the
//! union against node weights. Logs replicating at node scope skip the
//! domain machinery entirely and fall back to a flat uniform draw.
//!
//! # Example
//! ```ignore
//! use logtide_nodeset::{CrossDomainNodeSetSelector, NodeSetSelector, SelectionOptions};
//!
//! let selector = CrossDomainNodeSetSelector::default();
//! let decision = selector.select(&config, log_id, previous.as_ref(), &options)?;
//! ```

pub mod domain_map;
pub mod flat;
pub mod planner;
pub mod sampler;
pub mod selector;
pub mod validator;

pub use domain_map::{DomainMap, build_domain_map};
pub use flat::RandomNodeSetSelector;
pub use planner::plan_nodeset_size;
pub use sampler::sample_from_domain;
pub use selector::{
    CrossDomainNodeSetSelector, Decision, NodeSetSelector, SelectionOptions,
    last_selection_error,
};
pub use validator::valid_storage_set;
