//! Banker's matrices derived from a live session.

use deadsim_core::{Matrix, Session};
use deadsim_types::{ProcessId, ResourceKind, ResourceVector};
use serde::Serialize;

/// Allocation/Max/Need/Available view of a session.
///
/// Columns follow the resource catalog; rows follow the session's process
/// list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrices {
    pub kinds: Vec<ResourceKind>,
    pub proc_ids: Vec<ProcessId>,
    /// Available plus everything allocated. The session never stores totals.
    pub total: ResourceVector,
    pub available: ResourceVector,
    /// Units currently held.
    pub allocation: Matrix,
    /// Declared maximum claim: occurrences of each kind in the allocation order.
    pub max: Matrix,
    /// What each process may still request.
    pub need: Matrix,
}

impl Matrices {
    /// Row of `matrix` for `id`, zero if absent.
    pub fn row(matrix: &Matrix, id: &ProcessId) -> ResourceVector {
        matrix.get(id).copied().unwrap_or_default()
    }
}

/// Build the banker's matrices for `session`.
///
/// `need = max - allocation`, floored at the requests the process actually
/// has left, so a finished process needs nothing even if it gave its units
/// back early.
pub fn build_matrices(session: &Session) -> Matrices {
    let mut allocation = Matrix::with_capacity(session.procs.len());
    let mut max = Matrix::with_capacity(session.procs.len());
    let mut need = Matrix::with_capacity(session.procs.len());

    let mut available = ResourceVector::zero();
    for (&kind, &free) in session.available.iter() {
        available[kind] = free;
    }
    let mut total = available;

    for p in session.procs.iter() {
        let alloc = ResourceVector::from_pairs(p.holding.iter().map(|(&k, &n)| (k, n)));
        let claim = ResourceVector::from_kinds(&p.order);
        let pending = if p.is_done() {
            ResourceVector::zero()
        } else {
            ResourceVector::from_kinds(p.remaining())
        };

        total = total.plus(&alloc);
        need.insert(
            p.id.clone(),
            claim.saturating_sub(&alloc).component_min(&pending),
        );
        allocation.insert(p.id.clone(), alloc);
        max.insert(p.id.clone(), claim);
    }

    Matrices {
        kinds: ResourceKind::ALL.to_vec(),
        proc_ids: session.procs.iter().map(|p| p.id.clone()).collect(),
        total,
        available,
        allocation,
        max,
        need,
    }
}
