//! Storage-set size planning
//!
//! Resolves the final storage-set size and per-domain quota, pruning
//! under-populated domains when they would bottleneck the result.

use crate::domain_map::DomainMap;
use logtide_common::{Error, Result};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::warn;

/// Why a caller-provided size target could not be used verbatim
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TargetRejection {
    NotDivisible,
    TooSmall,
    TooLarge,
    SmallDomainBottleneck,
}

impl TargetRejection {
    const fn as_str(self) -> &'static str {
        match self {
            Self::NotDivisible => "not divisible by the domain count",
            Self::TooSmall => "smaller than the replication factor",
            Self::TooLarge => "larger than the eligible cluster",
            Self::SmallDomainBottleneck => "capped by the smallest domain",
        }
    }
}

/// Resolve the storage-set size for `target` over `domains`
///
/// Picks the largest size `q * |domains|` whose per-domain quota `q`
/// divides evenly, covers `replication_factor`, fits the eligible cluster,
/// and does not exceed the smallest domain. A `target` already satisfying
/// all four conditions is adopted verbatim without touching the map.
///
/// When the smallest domains cap the result, they are pruned and planning
/// reruns on the remainder; a pruned plan replaces the incumbent only when
/// it gains more than one node per remaining domain, so a sliver of extra
/// capacity never costs an entire domain of redundancy.
///
/// On return `domains` holds the map of the winning plan. The caller must
/// sample from that map, never from the original.
///
/// # Errors
/// `NoEligibleDomains` when `domains` is empty.
pub fn plan_nodeset_size(
    target: usize,
    replication_factor: usize,
    domains: &mut DomainMap,
) -> Result<usize> {
    let mut best: Option<(usize, DomainMap)> = None;

    loop {
        let num_domains = domains.len();
        if num_domains == 0 {
            break;
        }

        let cluster: usize = domains.values().map(Vec::len).sum();
        let min_domain = domains.values().map(Vec::len).min().unwrap_or(0);

        let (size, retry) = match check_target(
            target,
            replication_factor,
            num_domains,
            cluster,
            min_domain,
        ) {
            None => (target, false),
            Some(rejection) => {
                let q_min = replication_factor.div_ceil(num_domains);
                let q_max = cluster / num_domains;
                // max-then-min so an unsatisfiable q_min still lands on q_max
                let mut quota = rounded_div(target, num_domains).max(q_min).min(q_max);
                let mut retry = false;
                if quota > min_domain {
                    quota = min_domain;
                    retry = true;
                }
                let size = quota * num_domains;
                advise_override(target, size, rejection);
                (size, retry)
            }
        };

        let improves = match &best {
            None => true,
            Some((best_size, _)) => size > *best_size + num_domains,
        };
        if improves {
            best = Some((size, domains.clone()));
        }

        if !retry {
            break;
        }
        domains.retain(|_, nodes| nodes.len() > min_domain);
    }

    match best {
        Some((size, map)) => {
            *domains = map;
            Ok(size)
        }
        None => Err(Error::NoEligibleDomains),
    }
}

/// First reason `target` cannot be used verbatim, if any
fn check_target(
    target: usize,
    replication_factor: usize,
    num_domains: usize,
    cluster: usize,
    min_domain: usize,
) -> Option<TargetRejection> {
    if target % num_domains != 0 {
        Some(TargetRejection::NotDivisible)
    } else if target < replication_factor {
        Some(TargetRejection::TooSmall)
    } else if target > cluster {
        Some(TargetRejection::TooLarge)
    } else if target > min_domain * num_domains {
        Some(TargetRejection::SmallDomainBottleneck)
    } else {
        None
    }
}

/// Integer division rounding half away from zero
const fn rounded_div(dividend: usize, divisor: usize) -> usize {
    (dividend + divisor / 2) / divisor
}

static ADVISORY_LIMIT: RateLimiter = RateLimiter::new(10, Duration::from_secs(10));

fn advise_override(requested: usize, chosen: usize, rejection: TargetRejection) {
    if ADVISORY_LIMIT.allow() {
        warn!(
            requested,
            chosen,
            reason = rejection.as_str(),
            "overriding requested storage-set size"
        );
    }
}

/// Fixed-window limiter for advisory log lines
struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    state: Mutex<Option<Window>>,
}

struct Window {
    started: Instant,
    emitted: u32,
}

impl RateLimiter {
    const fn new(max_per_window: u32, window: Duration) -> Self {
        Self {
            max_per_window,
            window,
            state: Mutex::new(None),
        }
    }

    fn allow(&self) -> bool {
        let mut state = self.state.lock();
        let now = Instant::now();
        let window = state.get_or_insert_with(|| Window {
            started: now,
            emitted: 0,
        });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.emitted = 0;
        }
        if window.emitted < self.max_per_window {
            window.emitted += 1;
            true
        } else {
            false
        }
    }
}
