//! The global acquisition-order predicate.

use deadsim_types::ResourceKind;
use std::collections::BTreeMap;

/// Position of `kind` in the priority order.
///
/// Kinds missing from the order rank after every listed kind.
pub fn priority_index(priority: &[ResourceKind], kind: ResourceKind) -> usize {
    priority
        .iter()
        .position(|&k| k == kind)
        .unwrap_or(usize::MAX)
}

/// Decide whether acquiring `requested` respects the global order.
///
/// A process may only acquire kinds in non-decreasing priority index. The
/// request is rejected if the process already holds a kind with a strictly
/// greater index (lower priority) than `requested`.
///
/// - an empty order imposes no constraint
/// - a requested kind absent from the order is unconstrained
/// - held kinds absent from the order never block a request
pub fn can_grant(
    requested: ResourceKind,
    holding: &BTreeMap<ResourceKind, u32>,
    priority: &[ResourceKind],
) -> bool {
    if priority.is_empty() {
        return true;
    }
    let Some(idx_req) = priority.iter().position(|&k| k == requested) else {
        return true;
    };

    holding
        .iter()
        .filter(|&(_, &n)| n > 0)
        .filter_map(|(&k, _)| priority.iter().position(|&p| p == k))
        .all(|idx_held| idx_held <= idx_req)
}
