//! Per-domain node sampling
//!
//! Draws a fixed count of nodes uniformly without replacement, draining
//! positively weighted nodes before falling back to zero-weight ones.

use logtide_common::{ClusterConfig, Error, NodeIndex, Result};
use rand::Rng;
use rand::seq::SliceRandom;

/// Draw `count` distinct nodes from `domain_nodes`
///
/// Partitions the domain into a preferred pool (positive weight) and a
/// fallback pool (zero weight), samples uniformly from the preferred pool
/// first, and tops up from the fallback pool only when the preferred pool
/// runs short. The draw is exchangeable within each pool, so a fixed rng
/// seed reproduces the same selection for the same inputs.
///
/// # Errors
/// `NotEnoughInDomain` when both pools together cannot cover `count`.
pub fn sample_from_domain<R: Rng + ?Sized>(
    rng: &mut R,
    domain: &str,
    domain_nodes: &[NodeIndex],
    count: usize,
    cluster: &ClusterConfig,
) -> Result<Vec<NodeIndex>> {
    if domain_nodes.len() < count {
        return Err(Error::NotEnoughInDomain {
            domain: domain.to_string(),
            available: domain_nodes.len(),
            required: count,
        });
    }

    let (mut preferred, mut fallback): (Vec<NodeIndex>, Vec<NodeIndex>) =
        domain_nodes.iter().copied().partition(|index| {
            cluster
                .node(*index)
                .is_some_and(|node| node.weight > 0.0)
        });

    preferred.shuffle(rng);
    let mut picked = preferred;
    picked.truncate(count);
    if picked.len() < count {
        fallback.shuffle(rng);
        fallback.truncate(count - picked.len());
        picked.append(&mut fallback);
    }
    Ok(picked)
}
