//! Per-visit decisions.
//!
//! The engine visits processes in round-robin order and asks the active
//! strategy what the visited process may do. A strategy only *decides*; the
//! engine applies grants, preemptions and reorders to the working session.

use deadsim_avoidance::simulate_grant_and_check_safe;
use deadsim_core::Session;
use deadsim_prevention::{plan_next, PreemptCause, PreventionStep};
use deadsim_types::{AlgorithmType, ResourceKind};

/// Why a visited process could not act.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    /// Recently restarted; skipped until the cooldown expires.
    Cooldown,
    /// No free unit of the requested kind.
    Unavailable,
    /// A unit is free but granting it would leave no safe sequence.
    Unsafe,
    /// The process has no further request.
    NothingToRequest,
}

/// What the visited process does this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Take one unit of `kind`.
    Grant(ResourceKind),
    /// Swap the next request with the pending request at `position`.
    Reorder { position: usize, kind: ResourceKind },
    /// Drop everything and restart.
    Preempt(PreemptCause),
    /// Do nothing.
    Wait(WaitReason),
}

/// Resource-management strategy, fixed by the session's algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// No algorithm selected: grant whenever a unit is free.
    Unmanaged,
    /// Global resource ordering.
    Prevention { priority: Vec<ResourceKind> },
    /// Banker's algorithm.
    Avoidance,
    /// Grant freely; a stalled sweep is declared a deadlock.
    Detection,
}

impl Strategy {
    pub fn for_session(session: &Session) -> Self {
        match session.algorithm {
            None => Strategy::Unmanaged,
            Some(AlgorithmType::Prevention) => Strategy::Prevention {
                priority: session.prevention_order.clone(),
            },
            Some(AlgorithmType::Avoidance) => Strategy::Avoidance,
            Some(AlgorithmType::Detection) => Strategy::Detection,
        }
    }

    /// Whether a sweep without any action is reported as a deadlock.
    ///
    /// Prevention and Avoidance never declare deadlock; a stalled sweep under
    /// them is only logged.
    pub fn declares_deadlock(&self) -> bool {
        matches!(self, Strategy::Unmanaged | Strategy::Detection)
    }

    /// Decide what the process at `index` does.
    ///
    /// Only Avoidance touches the session, to refresh its cached
    /// [`SafetyTrace`](deadsim_core::SafetyTrace). Allocation state is never
    /// changed here.
    pub fn decide(&self, session: &mut Session, index: usize) -> Decision {
        let Some(proc) = session.procs.get(index) else {
            return Decision::Wait(WaitReason::NothingToRequest);
        };
        if proc.cooldown > 0 {
            return Decision::Wait(WaitReason::Cooldown);
        }
        let Some(need) = proc.next_need() else {
            return Decision::Wait(WaitReason::NothingToRequest);
        };

        match self {
            Strategy::Unmanaged | Strategy::Detection => grant_if_free(session, need),

            Strategy::Prevention { priority } => match plan_next(proc, priority) {
                Some(PreventionStep::Request(kind)) => grant_if_free(session, kind),
                Some(PreventionStep::Reorder { position, kind }) => {
                    Decision::Reorder { position, kind }
                }
                Some(PreventionStep::Preempt(cause)) => Decision::Preempt(cause),
                None => Decision::Wait(WaitReason::NothingToRequest),
            },

            Strategy::Avoidance => {
                let proc_id = proc.id.clone();
                session.avoidance_trace = None;
                if session.available_of(need) == 0 {
                    return Decision::Wait(WaitReason::Unavailable);
                }
                let check = simulate_grant_and_check_safe(session, &proc_id, need);
                session.avoidance_trace = Some(check.trace);
                if check.safe {
                    Decision::Grant(need)
                } else {
                    Decision::Wait(WaitReason::Unsafe)
                }
            }
        }
    }
}

fn grant_if_free(session: &Session, kind: ResourceKind) -> Decision {
    if session.available_of(kind) > 0 {
        Decision::Grant(kind)
    } else {
        Decision::Wait(WaitReason::Unavailable)
    }
}
