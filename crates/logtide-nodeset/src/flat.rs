//! Flat fallback selection
//!
//! Node-scope replication needs no cross-domain spreading: the whole
//! eligible pool is one domain and any draw of distinct nodes satisfies
//! the replication property.

use logtide_common::{
    Configuration, ClusterConfig, Error, LogId, NodeIndex, ReplicationProperty, Result,
    StorageSet,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::sampler::sample_from_domain;
use crate::selector::{Decision, NodeSetSelector, SelectionOptions};
use crate::validator::valid_storage_set;

/// Uniform selector over the whole eligible node pool
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomNodeSetSelector;

impl RandomNodeSetSelector {
    fn eligible_pool(cluster: &ClusterConfig, options: &SelectionOptions) -> Vec<NodeIndex> {
        cluster
            .nodes()
            .filter(|(index, node)| {
                node.include_in_nodesets && !options.exclude_nodes.contains(index)
            })
            .map(|(index, _)| index)
            .collect()
    }
}

/// Clamp the requested size into `[replication_factor, pool]`
fn resolve_size(target: Option<usize>, replication_factor: usize, pool: usize) -> Result<usize> {
    if pool < replication_factor {
        return Err(Error::NotEnoughNodes {
            available: pool,
            required: replication_factor,
        });
    }
    Ok(target.unwrap_or(pool).clamp(replication_factor, pool))
}

impl NodeSetSelector for RandomNodeSetSelector {
    fn select(
        &self,
        config: &Configuration,
        log_id: LogId,
        previous: Option<&StorageSet>,
        options: &SelectionOptions,
    ) -> Result<Decision> {
        let Some(group) = config.logs.log_group(log_id) else {
            return Err(Error::LogNotFound(log_id));
        };
        let replication_factor = group.replication.replication_factor();

        let pool = Self::eligible_pool(&config.cluster, options);
        let size = resolve_size(group.nodeset_size, replication_factor, pool.len())?;

        let mut rng = match options.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let picked = sample_from_domain(&mut rng, "", &pool, size, &config.cluster)?;
        let result = StorageSet::from_unsorted(picked);

        if !valid_storage_set(&config.cluster, &result, &group.replication) {
            return Err(Error::InvalidWeights);
        }

        if previous == Some(&result) {
            debug!(%log_id, size = result.len(), "storage set unchanged");
            return Ok(Decision::Keep);
        }
        debug!(%log_id, size = result.len(), "storage set selected");
        Ok(Decision::NeedsChange(result))
    }

    fn suggested_size(
        &self,
        config: &Configuration,
        _log_id: LogId,
        target: Option<usize>,
        replication: &ReplicationProperty,
        options: &SelectionOptions,
    ) -> Result<usize> {
        let pool = Self::eligible_pool(&config.cluster, options);
        resolve_size(target, replication.replication_factor(), pool.len())
    }
}
