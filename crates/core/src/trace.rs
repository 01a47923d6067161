//! Banker's algorithm trace records.
//!
//! A [`SafetyTrace`] captures everything the avoidance check looked at when
//! deciding on one hypothetical grant, so a collaborator can render the
//! matrices and the work-vector trajectory after the fact.

use deadsim_types::{ProcessId, ResourceKind, ResourceVector, Tick};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row per process, in process-list order.
pub type Matrix = IndexMap<ProcessId, ResourceVector>;

/// One step of the safety check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyStep {
    /// Work vector after this step.
    pub work: ResourceVector,
    /// Process that completed in this step. `None` marks the final snapshot
    /// of an unsafe run, where nobody else could complete.
    pub finished: Option<ProcessId>,
}

/// Why a hypothetical grant was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The request exceeds what the process still declares it needs.
    ExceedsNeed,
    /// Not enough free units right now.
    InsufficientAvailability,
    /// Granting leaves no order in which every process can complete.
    Unsafe,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RejectReason::ExceedsNeed => "exceeds declared need",
            RejectReason::InsufficientAvailability => "insufficient availability",
            RejectReason::Unsafe => "unsafe: no completing sequence exists",
        })
    }
}

/// Available/Allocation/Need after applying a hypothetical grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypotheticalState {
    pub available: ResourceVector,
    pub allocation: Matrix,
    pub need: Matrix,
}

/// Full record of one avoidance decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyTrace {
    pub tick: Tick,
    pub process_id: ProcessId,
    pub process_name: String,
    pub requested_kind: ResourceKind,

    // Pre-state
    pub total: ResourceVector,
    pub available_before: ResourceVector,
    pub allocation_before: Matrix,
    pub max: Matrix,
    pub need_before: Matrix,

    /// The evaluated request (one unit of `requested_kind`).
    pub request: ResourceVector,

    /// Work-vector trajectory of the safety check. Empty on a hard rejection.
    pub work_steps: Vec<SafetyStep>,

    pub safe: bool,
    /// One valid completion order, present only when safe.
    pub safe_sequence: Option<Vec<ProcessId>>,
    /// Present only when not safe.
    pub reason: Option<RejectReason>,
    /// Post-state, present only when safe.
    pub after: Option<HypotheticalState>,
}
