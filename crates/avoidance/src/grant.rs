//! Hypothetical grants.

use crate::{build_matrices, safety_check, Matrices};
use deadsim_core::{HypotheticalState, RejectReason, SafetyTrace, Session};
use deadsim_types::{ProcessId, ResourceKind, ResourceVector};
use tracing::debug;

/// Outcome of checking one hypothetical grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantCheck {
    pub safe: bool,
    pub trace: SafetyTrace,
}

/// Check whether granting one unit of `kind` to `proc_id` keeps the
/// session safe.
///
/// Two hard rejections come first and skip the safety check entirely: the
/// request must fit in the process's remaining need and in what is currently
/// available. Otherwise the grant is applied to a copy of the matrices and
/// the banker's check decides.
///
/// An unknown `proc_id` has no need and is rejected as exceeding it.
pub fn simulate_grant_and_check_safe(
    session: &Session,
    proc_id: &ProcessId,
    kind: ResourceKind,
) -> GrantCheck {
    let Matrices {
        proc_ids,
        total,
        available,
        allocation,
        max,
        need,
        ..
    } = build_matrices(session);

    let process_name = session
        .process(proc_id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| proc_id.to_string());
    let request = ResourceVector::unit(kind);

    let rejection = if !request.le(&Matrices::row(&need, proc_id)) {
        Some(RejectReason::ExceedsNeed)
    } else if !request.le(&available) {
        Some(RejectReason::InsufficientAvailability)
    } else {
        None
    };

    let mut trace = SafetyTrace {
        tick: session.t,
        process_id: proc_id.clone(),
        process_name,
        requested_kind: kind,
        total,
        available_before: available,
        allocation_before: allocation,
        max,
        need_before: need,
        request,
        work_steps: Vec::new(),
        safe: false,
        safe_sequence: None,
        reason: rejection,
        after: None,
    };

    if let Some(reason) = rejection {
        debug!(
            tick = session.t,
            process = %proc_id,
            %kind,
            %reason,
            "Hypothetical grant rejected"
        );
        return GrantCheck { safe: false, trace };
    }

    let available_after = available.saturating_sub(&request);
    let mut allocation_after = trace.allocation_before.clone();
    let mut need_after = trace.need_before.clone();
    if let Some(row) = allocation_after.get_mut(proc_id) {
        row[kind] += 1;
    }
    if let Some(row) = need_after.get_mut(proc_id) {
        row[kind] = row[kind].saturating_sub(1);
    }

    let outcome = safety_check(&available_after, &allocation_after, &need_after, &proc_ids);

    debug!(
        tick = session.t,
        process = %proc_id,
        %kind,
        safe = outcome.safe,
        sequence = ?outcome.sequence,
        "Safety check"
    );

    trace.work_steps = outcome.steps;
    trace.safe = outcome.safe;
    if outcome.safe {
        trace.safe_sequence = Some(outcome.sequence);
        trace.after = Some(HypotheticalState {
            available: available_after,
            allocation: allocation_after,
            need: need_after,
        });
    } else {
        trace.reason = Some(RejectReason::Unsafe);
    }

    GrantCheck {
        safe: trace.safe,
        trace,
    }
}

/// Check whether the session as it stands is safe.
pub fn is_safe_state(session: &Session) -> bool {
    let m = build_matrices(session);
    safety_check(&m.available, &m.allocation, &m.need, &m.proc_ids).safe
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadsim_types::Scenario;
    use ResourceKind::*;

    fn crossed() -> Session {
        let scenario = Scenario::new()
            .with_resource(Cpu, 1)
            .with_resource(Disk, 1)
            .with_process("p1", "proc_1", vec![Cpu, Disk])
            .with_process("p2", "proc_2", vec![Disk, Cpu]);
        Session::from_scenario(&scenario)
    }

    /// p1 holds the CPU and still wants the disk.
    fn p1_holds_cpu() -> Session {
        let mut s = crossed();
        s.available.insert(Cpu, 0);
        s.procs[0].hold(Cpu);
        s.procs[0].ptr = 1;
        s
    }

    #[test]
    fn test_first_grant_is_safe() {
        let s = crossed();
        let check = simulate_grant_and_check_safe(&s, &ProcessId::from("p1"), Cpu);

        assert!(check.safe);
        let trace = check.trace;
        assert_eq!(trace.reason, None);
        assert_eq!(
            trace.safe_sequence,
            Some(vec![ProcessId::from("p1"), ProcessId::from("p2")])
        );
        let after = trace.after.unwrap();
        assert_eq!(after.available[Cpu], 0);
        assert_eq!(after.allocation[&ProcessId::from("p1")][Cpu], 1);
        assert_eq!(after.need[&ProcessId::from("p1")][Cpu], 0);
        // The input session is untouched
        assert_eq!(s.available_of(Cpu), 1);
    }

    #[test]
    fn test_crossing_grant_is_unsafe() {
        let s = p1_holds_cpu();
        let check = simulate_grant_and_check_safe(&s, &ProcessId::from("p2"), Disk);

        assert!(!check.safe);
        assert_eq!(check.trace.reason, Some(RejectReason::Unsafe));
        assert_eq!(check.trace.safe_sequence, None);
        assert!(check.trace.after.is_none());
        assert_eq!(check.trace.work_steps.last().unwrap().finished, None);
    }

    #[test]
    fn test_completing_grant_is_safe() {
        let s = p1_holds_cpu();
        let check = simulate_grant_and_check_safe(&s, &ProcessId::from("p1"), Disk);
        assert!(check.safe);
    }

    #[test]
    fn test_hard_rejections() {
        let s = p1_holds_cpu();

        // p1 already has its only CPU
        let check = simulate_grant_and_check_safe(&s, &ProcessId::from("p1"), Cpu);
        assert!(!check.safe);
        assert_eq!(check.trace.reason, Some(RejectReason::ExceedsNeed));
        assert!(check.trace.work_steps.is_empty());

        // p2 wants the CPU, which is taken
        let check = simulate_grant_and_check_safe(&s, &ProcessId::from("p2"), Cpu);
        assert_eq!(
            check.trace.reason,
            Some(RejectReason::InsufficientAvailability)
        );

        // Unknown process
        let check = simulate_grant_and_check_safe(&s, &ProcessId::from("ghost"), Disk);
        assert_eq!(check.trace.reason, Some(RejectReason::ExceedsNeed));
        assert_eq!(check.trace.process_name, "ghost");
    }

    #[test]
    fn test_reason_messages() {
        assert_eq!(RejectReason::ExceedsNeed.to_string(), "exceeds declared need");
        assert_eq!(
            RejectReason::InsufficientAvailability.to_string(),
            "insufficient availability"
        );
        assert_eq!(
            RejectReason::Unsafe.to_string(),
            "unsafe: no completing sequence exists"
        );
    }

    #[test]
    fn test_is_safe_state() {
        assert!(is_safe_state(&crossed()));
        assert!(is_safe_state(&p1_holds_cpu()));

        let mut s = p1_holds_cpu();
        s.available.insert(Disk, 0);
        s.procs[1].hold(Disk);
        s.procs[1].ptr = 1;
        assert!(!is_safe_state(&s));
    }
}
