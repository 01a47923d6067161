//! Session transitions.
//!
//! Every function here takes a snapshot by reference and returns the next
//! snapshot. Inputs are never modified. Cloning a [`Session`] is cheap: the
//! process list, log and available pool are persistent structures that
//! share everything a transition does not touch.

use crate::strategy::{Decision, Strategy, WaitReason};
use deadsim_core::{LogKind, ProcState, Session};
use deadsim_prevention::PreemptCause;
use deadsim_types::{ProcessId, ResourceKind, Scenario};
use tracing::{debug, info, warn};

/// Build the initial session for a scenario.
///
/// The scenario is expected to pass [`Scenario::validate`]; the engine does
/// not re-check it.
pub fn initialize(scenario: &Scenario) -> Session {
    let session = Session::from_scenario(scenario);
    info!(
        processes = session.procs.len(),
        resources = session.available.len(),
        algorithm = ?session.algorithm,
        "Session initialized"
    );
    session
}

/// Advance the simulation by one tick.
///
/// One round-robin sweep starts at `rr_index`. The first process that can
/// act (grant, preempt or reorder) does so and ends the sweep, so at most one
/// allocation change happens per tick. A sweep without any action either
/// declares a deadlock or just notes that everyone waited, depending on the
/// strategy.
///
/// A session already in deadlock is returned unchanged until an operator
/// aborts or releases a process.
pub fn advance(session: &Session) -> Session {
    if session.deadlock {
        return session.clone();
    }

    let mut next = session.clone();
    next.t += 1;

    for i in 0..next.procs.len() {
        if next.procs[i].cooldown > 0 {
            next.procs[i].cooldown -= 1;
        }
    }

    let n = next.procs.len();
    if n == 0 {
        return next;
    }

    let strategy = Strategy::for_session(&next);
    let mut acted = false;
    let mut wait_logged = false;

    for k in 0..n {
        let i = (next.rr_index + k) % n;
        if next.procs[i].is_done() {
            continue;
        }
        let need = next.procs[i].next_need();

        match strategy.decide(&mut next, i) {
            Decision::Grant(kind) => {
                apply_grant(&mut next, i, kind);
                acted = true;
                break;
            }
            Decision::Reorder { position, kind } => {
                apply_reorder(&mut next, i, position, kind);
                acted = true;
                break;
            }
            Decision::Preempt(cause) => {
                apply_preempt(&mut next, i, cause);
                acted = true;
                break;
            }
            Decision::Wait(reason) => {
                if reason == WaitReason::Unsafe {
                    next.denied_unsafe += 1;
                }
                if !wait_logged {
                    let name = next.procs[i].name.clone();
                    let wanted = need.map_or_else(|| "nothing".to_string(), |k| k.to_string());
                    debug!(tick = next.t, process = %name, need = %wanted, ?reason, "Waiting");
                    next.push_log(LogKind::Wait, format!("{name} waits for {wanted}"));
                    next.wait_events += 1;
                    wait_logged = true;
                }
                next.procs[i].state = ProcState::Waiting;
            }
        }
    }

    next.rr_index = (next.rr_index + 1) % n;

    if !acted && !next.all_done() {
        if strategy.declares_deadlock() {
            next.deadlock = true;
            next.deadlocks_count += 1;
            warn!(tick = next.t, count = next.deadlocks_count, "Deadlock detected");
            next.push_log(LogKind::Deadlock, "detected");
        } else {
            debug!(tick = next.t, "No action this tick");
            next.push_log(LogKind::Info, "all processes waiting (no action this tick)");
        }
    }

    next
}

/// Abort a process: release its holdings, restart it from its first
/// request after a one-tick cooldown, and move it to the back of the
/// round-robin order. Clears the deadlock flag.
///
/// Unknown ids leave the session unchanged.
pub fn abort_process(session: &Session, id: &ProcessId) -> Session {
    let mut next = session.clone();
    let Some(index) = next.proc_index(id) else {
        return next;
    };

    let released = next.release_all(index);
    let mut proc = next.procs.remove(index);
    proc.ptr = 0;
    proc.state = ProcState::Ready;
    proc.cooldown = 1;
    let name = proc.name.clone();
    next.procs.push_back(proc);

    if index <= next.rr_index && next.rr_index > 0 {
        next.rr_index -= 1;
    }

    next.deadlock = false;
    next.manual_aborts += 1;
    info!(tick = next.t, process = %id, released = ?released, "Process aborted");
    next.push_log(
        LogKind::Abort,
        format!("{name} aborted, released its resources"),
    );
    next
}

/// Force-finish a process: release its holdings and mark it done. Clears
/// the deadlock flag. No cooldown, relocation or counters.
///
/// Unknown ids leave the session unchanged.
pub fn release_process(session: &Session, id: &ProcessId) -> Session {
    let mut next = session.clone();
    let Some(index) = next.proc_index(id) else {
        return next;
    };

    let released = next.release_all(index);
    next.procs[index].state = ProcState::Done;
    let name = next.procs[index].name.clone();

    next.deadlock = false;
    info!(tick = next.t, process = %id, released = ?released, "Process released");
    next.push_log(LogKind::Release, format!("{name} released manually"));
    next
}

// ═══════════════════════════════════════════════════════════════════════════
// Applying decisions
// ═══════════════════════════════════════════════════════════════════════════

fn apply_grant(next: &mut Session, index: usize, kind: ResourceKind) {
    let free = next.available_of(kind);
    debug_assert!(free > 0, "grant of {kind} with nothing free");
    next.available.insert(kind, free.saturating_sub(1));

    let proc = &mut next.procs[index];
    proc.hold(kind);
    proc.ptr += 1;
    let step = proc.ptr;
    let finished = proc.ptr >= proc.order.len();
    proc.state = if finished {
        ProcState::Done
    } else {
        ProcState::Ready
    };
    let name = proc.name.clone();

    debug!(tick = next.t, process = %name, %kind, step, "Granted");
    next.push_log(
        LogKind::Grant,
        format!("{name} acquired {kind} (step {step})"),
    );

    if finished {
        next.release_all(index);
        info!(tick = next.t, process = %name, "Process finished");
        next.push_log(
            LogKind::Finish,
            format!("{name} finished and released its resources"),
        );
    }
}

fn apply_reorder(next: &mut Session, index: usize, position: usize, kind: ResourceKind) {
    let proc = &mut next.procs[index];
    let ptr = proc.ptr;
    proc.order.swap(ptr, position);
    let name = proc.name.clone();

    next.reorder_events += 1;
    debug!(tick = next.t, process = %name, %kind, position, "Reordered");
    next.push_log(
        LogKind::Prevention,
        format!("{name} reordered; next request is {kind}"),
    );
}

fn apply_preempt(next: &mut Session, index: usize, cause: PreemptCause) {
    let held = next.release_all(index);
    let held_list = join_kinds(&held);

    let proc = &mut next.procs[index];
    proc.ptr = 0;
    proc.state = ProcState::Ready;
    proc.cooldown = proc.cooldown.max(1);
    proc.preemptions += 1;
    let name = proc.name.clone();

    next.prevented_deadlocks += 1;
    let message = match cause {
        PreemptCause::NoCompatibleRequest => format!(
            "aborted {name} (no remaining request respects the priority order; held {held_list})"
        ),
        PreemptCause::OrderViolation { requested } => format!(
            "aborted {name} for violating the priority order requesting {requested} while holding {held_list}"
        ),
    };
    warn!(tick = next.t, process = %name, ?cause, held = %held_list, "Preempted");
    next.push_log(LogKind::Prevention, message);
}

fn join_kinds(kinds: &[ResourceKind]) -> String {
    if kinds.is_empty() {
        return "nothing".to_string();
    }
    kinds
        .iter()
        .map(|k| k.code())
        .collect::<Vec<_>>()
        .join(", ")
}
