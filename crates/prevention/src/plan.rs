//! Per-process planning under the global acquisition order.

use crate::{can_grant, priority_index};
use deadsim_core::ProcRuntime;
use deadsim_types::ResourceKind;
use tracing::trace;

/// Why a process has to give everything back and restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreemptCause {
    /// Every pending request ranks below something already held.
    NoCompatibleRequest,
    /// The request at the cursor would break the order.
    OrderViolation { requested: ResourceKind },
}

/// What a process should do next to respect the global order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreventionStep {
    /// Request the kind at the cursor.
    Request(ResourceKind),
    /// Swap the pending request at `position` into the cursor slot.
    Reorder { position: usize, kind: ResourceKind },
    /// Release everything and restart from the first request.
    Preempt(PreemptCause),
}

/// Plan the next step for `proc`.
///
/// Among the pending requests, only those ranking at or after the
/// highest-ranked held kind are candidates. The best-ranked candidate (first
/// in current order on ties) is the one to request next; if it is not already
/// at the cursor it is swapped there first. Returns `None` for a process with
/// nothing left to request.
pub fn plan_next(proc: &ProcRuntime, priority: &[ResourceKind]) -> Option<PreventionStep> {
    let need = proc.next_need()?;

    let max_held = proc
        .holding
        .iter()
        .filter(|&(_, &n)| n > 0)
        .map(|(&k, _)| priority_index(priority, k))
        .max();

    let chosen = proc
        .remaining()
        .iter()
        .enumerate()
        .map(|(offset, &kind)| (priority_index(priority, kind), offset, kind))
        .filter(|&(idx, _, _)| max_held.map_or(true, |m| idx >= m))
        .min_by_key(|&(idx, offset, _)| (idx, offset));

    let Some((_, offset, kind)) = chosen else {
        trace!(process = %proc.id, "No pending request respects the priority order");
        return Some(PreventionStep::Preempt(PreemptCause::NoCompatibleRequest));
    };

    if kind != need {
        trace!(process = %proc.id, %kind, from = %need, "Reordering pending requests");
        return Some(PreventionStep::Reorder {
            position: proc.ptr + offset,
            kind,
        });
    }

    if !can_grant(kind, &proc.holding, priority) {
        return Some(PreventionStep::Preempt(PreemptCause::OrderViolation {
            requested: kind,
        }));
    }

    Some(PreventionStep::Request(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadsim_types::ProcessDef;
    use ResourceKind::*;

    fn proc(order: Vec<ResourceKind>) -> ProcRuntime {
        ProcRuntime::from_def(&ProcessDef::new("p", "p", order))
    }

    #[test]
    fn test_request_in_order() {
        let p = proc(vec![Cpu, Disk]);
        assert_eq!(
            plan_next(&p, &[Cpu, Disk]),
            Some(PreventionStep::Request(Cpu))
        );
    }

    #[test]
    fn test_reorder_brings_best_ranked_forward() {
        let p = proc(vec![Mutex, Disk, Cpu]);
        assert_eq!(
            plan_next(&p, &[Cpu, Disk, Mutex]),
            Some(PreventionStep::Reorder {
                position: 2,
                kind: Cpu
            })
        );
    }

    #[test]
    fn test_reorder_position_is_absolute() {
        let mut p = proc(vec![Cpu, Mutex, Disk]);
        p.hold(Cpu);
        p.ptr = 1;
        assert_eq!(
            plan_next(&p, &[Cpu, Disk, Mutex]),
            Some(PreventionStep::Reorder {
                position: 2,
                kind: Disk
            })
        );
    }

    #[test]
    fn test_ties_keep_current_order() {
        // Both unlisted kinds rank equally; the first one stays put.
        let p = proc(vec![Net, Semaphore]);
        assert_eq!(plan_next(&p, &[Cpu]), Some(PreventionStep::Request(Net)));
    }

    #[test]
    fn test_preempt_when_nothing_compatible() {
        // Holds Mutex (last), still needs Cpu (first).
        let mut p = proc(vec![Mutex, Cpu]);
        p.hold(Mutex);
        p.ptr = 1;
        assert_eq!(
            plan_next(&p, &[Cpu, Disk, Mutex]),
            Some(PreventionStep::Preempt(PreemptCause::NoCompatibleRequest))
        );
    }

    #[test]
    fn test_repeated_kind_is_compatible() {
        let mut p = proc(vec![Disk, Disk]);
        p.hold(Disk);
        p.ptr = 1;
        assert_eq!(
            plan_next(&p, &[Cpu, Disk]),
            Some(PreventionStep::Request(Disk))
        );
    }

    #[test]
    fn test_finished_process_has_no_plan() {
        let mut p = proc(vec![Cpu]);
        p.ptr = 1;
        assert_eq!(plan_next(&p, &[Cpu]), None);
    }
}
