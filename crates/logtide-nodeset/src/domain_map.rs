//! Domain map construction
//!
//! Groups nodeset-eligible storage nodes into failure domains at a given
//! scope, keyed by the location prefix up to that scope.

use crate::selector::SelectionOptions;
use logtide_common::{ClusterConfig, Error, NodeIndex, NodeLocationScope, Result};
use std::collections::BTreeMap;

/// Storage nodes grouped by failure domain
///
/// Keys are domain prefix strings; key order gives the deterministic
/// iteration order the selector relies on. Each bucket preserves ascending
/// node index.
pub type DomainMap = BTreeMap<String, Vec<NodeIndex>>;

/// Group eligible storage nodes into failure domains at `scope`
///
/// Malformed locations fail the whole build: every node in the cluster must
/// carry a location that specifies `scope`, whether or not the node would
/// later be skipped. Exclusion-list membership and nodes opted out of
/// nodesets are skipped silently.
///
/// # Errors
/// `MissingLocation` if a node has no location at all; `ScopeNotSpecified`
/// if a node's location lacks a label at `scope`.
pub fn build_domain_map(
    cluster: &ClusterConfig,
    scope: NodeLocationScope,
    options: &SelectionOptions,
) -> Result<DomainMap> {
    let mut domains = DomainMap::new();
    for (index, node) in cluster.nodes() {
        let Some(location) = &node.location else {
            return Err(Error::MissingLocation { node: index });
        };
        if !location.scope_specified(scope) {
            return Err(Error::ScopeNotSpecified {
                node: index,
                scope,
                location: location.to_string(),
            });
        }
        if options.exclude_nodes.contains(&index) {
            continue;
        }
        if !node.include_in_nodesets {
            continue;
        }
        domains
            .entry(location.domain(scope))
            .or_default()
            .push(index);
    }
    Ok(domains)
}
