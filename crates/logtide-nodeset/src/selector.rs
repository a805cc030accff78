//! Storage-set selection facade
//!
//! Orchestrates domain-map construction, size planning, per-domain
//! sampling, and weight validation into a single selection decision.

use std::cell::Cell;
use std::collections::BTreeSet;

use logtide_common::{
    Configuration, Error, ErrorKind, LogId, NodeIndex, NodeLocationScope,
    ReplicationProperty, Result, StorageSet,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain_map::build_domain_map;
use crate::flat::RandomNodeSetSelector;
use crate::planner::plan_nodeset_size;
use crate::sampler::sample_from_domain;
use crate::validator::valid_storage_set;

/// Outcome of a selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// The supplied previous storage set still matches what selection produces
    Keep,
    /// A different storage set should be installed
    NeedsChange(StorageSet),
}

/// Caller-supplied selection knobs
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptions {
    /// Nodes to leave out of the result regardless of eligibility
    #[serde(default)]
    pub exclude_nodes: BTreeSet<NodeIndex>,
    /// Seed for the sampling rng; `None` draws one from process entropy
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

thread_local! {
    static LAST_ERROR: Cell<Option<ErrorKind>> = const { Cell::new(None) };
}

/// Last selection failure observed on this thread, if any
///
/// Legacy accommodation for callers that read an error slot instead of the
/// returned `Result`; cleared by the next successful selection. New code
/// should match on the `Result` alone.
#[must_use]
pub fn last_selection_error() -> Option<ErrorKind> {
    LAST_ERROR.get()
}

fn record_outcome<T>(result: Result<T>) -> Result<T> {
    match &result {
        Ok(_) => LAST_ERROR.set(None),
        Err(err) => LAST_ERROR.set(Some(err.kind())),
    }
    result
}

/// Capability interface for storage-set selection strategies
pub trait NodeSetSelector {
    /// Compute a storage set for `log_id` and compare it against `previous`
    ///
    /// # Errors
    /// Any of the selection error kinds; see the crate documentation.
    fn select(
        &self,
        config: &Configuration,
        log_id: LogId,
        previous: Option<&StorageSet>,
        options: &SelectionOptions,
    ) -> Result<Decision>;

    /// Resolve the storage-set size this strategy would aim for
    ///
    /// # Errors
    /// Same kinds as [`NodeSetSelector::select`], minus sampling failures.
    fn suggested_size(
        &self,
        config: &Configuration,
        log_id: LogId,
        target: Option<usize>,
        replication: &ReplicationProperty,
        options: &SelectionOptions,
    ) -> Result<usize>;
}

/// Selector that spreads the storage set across failure domains at the
/// log's sync replication scope
///
/// The resulting set is balanced: every contributing domain supplies
/// exactly `size / num_domains` nodes, so any `replication_factor` replicas
/// placed into the set can land in distinct domains. Logs replicating at
/// `Node` scope need no spreading and are delegated to the flat selector
/// `F`, resolved at construction time.
#[derive(Clone, Debug, Default)]
pub struct CrossDomainNodeSetSelector<F = RandomNodeSetSelector> {
    flat: F,
}

impl<F: NodeSetSelector> CrossDomainNodeSetSelector<F> {
    /// Create a selector delegating node-scope logs to `flat`
    pub const fn new(flat: F) -> Self {
        Self { flat }
    }

    fn select_inner(
        &self,
        config: &Configuration,
        log_id: LogId,
        previous: Option<&StorageSet>,
        options: &SelectionOptions,
    ) -> Result<Decision> {
        let Some(group) = config.logs.log_group(log_id) else {
            error!(%log_id, "log group not found");
            return Err(Error::LogNotFound(log_id));
        };
        let (scope, replication_factor) = group.replication.reduce();

        if scope == NodeLocationScope::Node {
            return self.flat.select(config, log_id, previous, options);
        }
        if scope >= NodeLocationScope::Root {
            error!(%log_id, %scope, "replication scope cannot constrain selection");
            return Err(Error::InvalidScope(scope));
        }

        let mut domains = build_domain_map(&config.cluster, scope, options)
            .inspect_err(|err| error!(%log_id, %err, "failed to build domain map"))?;

        let eligible: usize = domains.values().map(Vec::len).sum();
        let target = group.nodeset_size.unwrap_or(eligible);
        let size = plan_nodeset_size(target, replication_factor, &mut domains)
            .inspect_err(|err| error!(%log_id, %err, "storage-set size planning failed"))?;
        let quota = size / domains.len();

        let mut rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut picked = Vec::with_capacity(size);
        for (domain, nodes) in &domains {
            let sampled = sample_from_domain(&mut rng, domain, nodes, quota, &config.cluster)
                .inspect_err(|err| error!(%log_id, %err, "domain cannot fill its quota"))?;
            picked.extend(sampled);
        }

        // Domains partition the cluster, so the union cannot contain
        // duplicates; losing length here would be a programming error.
        let sampled_total = picked.len();
        let result = StorageSet::from_unsorted(picked);
        debug_assert_eq!(result.len(), sampled_total);

        if !valid_storage_set(&config.cluster, &result, &group.replication) {
            error!(%log_id, set = %result, "storage set rejected by weight validation");
            return Err(Error::InvalidWeights);
        }

        if previous == Some(&result) {
            debug!(%log_id, size = result.len(), "storage set unchanged");
            return Ok(Decision::Keep);
        }
        debug!(%log_id, size = result.len(), "storage set selected");
        Ok(Decision::NeedsChange(result))
    }
}

impl<F: NodeSetSelector> NodeSetSelector for CrossDomainNodeSetSelector<F> {
    fn select(
        &self,
        config: &Configuration,
        log_id: LogId,
        previous: Option<&StorageSet>,
        options: &SelectionOptions,
    ) -> Result<Decision> {
        record_outcome(self.select_inner(config, log_id, previous, options))
    }

    fn suggested_size(
        &self,
        config: &Configuration,
        log_id: LogId,
        target: Option<usize>,
        replication: &ReplicationProperty,
        options: &SelectionOptions,
    ) -> Result<usize> {
        let (scope, replication_factor) = replication.reduce();
        if scope == NodeLocationScope::Node {
            return self
                .flat
                .suggested_size(config, log_id, target, replication, options);
        }
        if scope >= NodeLocationScope::Root {
            return Err(Error::InvalidScope(scope));
        }
        let mut domains = build_domain_map(&config.cluster, scope, options)?;
        let eligible: usize = domains.values().map(Vec::len).sum();
        plan_nodeset_size(target.unwrap_or(eligible), replication_factor, &mut domains)
    }
}
