//! Live simulation state.
//!
//! A [`Session`] is a value: every engine operation clones the input
//! snapshot and returns the modified clone. The collections that are
//! copied on every tick are `im` persistent structures, so a clone is O(1)
//! and unchanged parts are shared between snapshots.

use crate::{ActionLog, LogKind, SafetyTrace};
use deadsim_types::{AlgorithmType, ProcessDef, ProcessId, ResourceKind, Scenario, Tick};
use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lifecycle state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcState {
    /// Able to act on its next visit.
    Ready,
    /// Could not act on its last visit.
    Waiting,
    /// Completed its order (or was force-finished); holds nothing.
    Done,
}

/// Per-process runtime state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcRuntime {
    pub id: ProcessId,
    pub name: String,

    /// Working copy of the allocation order. Prevention may permute the
    /// not-yet-granted suffix.
    pub order: Vec<ResourceKind>,

    /// Index of the next unsatisfied request; `ptr == order.len()` means finished.
    pub ptr: usize,

    /// Units currently granted, per kind. Only positive counts are stored.
    pub holding: BTreeMap<ResourceKind, u32>,

    pub state: ProcState,

    /// Ticks remaining before the process may act again.
    pub cooldown: u32,

    /// Times Prevention forced this process to restart.
    pub preemptions: u32,
}

impl ProcRuntime {
    /// Build the runtime form of a process definition.
    pub fn from_def(def: &ProcessDef) -> Self {
        Self {
            id: def.id.clone(),
            name: def.name.clone(),
            order: def.allocation_order.clone(),
            ptr: 0,
            holding: BTreeMap::new(),
            state: if def.allocation_order.is_empty() {
                ProcState::Done
            } else {
                ProcState::Ready
            },
            cooldown: 0,
            preemptions: 0,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ProcState::Done
    }

    /// The kind this process requests next, if any.
    pub fn next_need(&self) -> Option<ResourceKind> {
        self.order.get(self.ptr).copied()
    }

    /// Requests not yet granted, in current order.
    pub fn remaining(&self) -> &[ResourceKind] {
        self.order.get(self.ptr..).unwrap_or(&[])
    }

    /// Units of `kind` currently held.
    pub fn held(&self, kind: ResourceKind) -> u32 {
        self.holding.get(&kind).copied().unwrap_or(0)
    }

    /// Kinds held in positive quantity.
    pub fn held_kinds(&self) -> Vec<ResourceKind> {
        self.holding
            .iter()
            .filter(|&(_, &n)| n > 0)
            .map(|(&k, _)| k)
            .collect()
    }

    /// Record one granted unit of `kind`.
    pub fn hold(&mut self, kind: ResourceKind) {
        *self.holding.entry(kind).or_insert(0) += 1;
    }
}

/// The live simulation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Logical tick counter.
    pub t: Tick,

    /// Free units per configured kind.
    pub available: OrdMap<ResourceKind, u32>,

    /// Processes in round-robin order.
    pub procs: Vector<ProcRuntime>,

    /// Append-only, ordered by `t`.
    pub logs: Vector<ActionLog>,

    /// Set when a sweep made no progress under Detection (or no strategy).
    pub deadlock: bool,
    pub deadlocks_count: u32,

    pub algorithm: Option<AlgorithmType>,
    /// Global acquisition order; empty unless the algorithm is Prevention.
    pub prevention_order: Vec<ResourceKind>,

    /// Where the next round-robin sweep starts.
    pub rr_index: usize,

    // Strategy counters
    pub prevented_deadlocks: u32,
    pub manual_aborts: u32,
    pub wait_events: u32,
    pub reorder_events: u32,
    pub denied_unsafe: u32,

    /// Last avoidance decision, kept for inspection.
    pub avoidance_trace: Option<SafetyTrace>,
}

impl Session {
    /// Build the initial session for a scenario.
    ///
    /// The scenario is assumed valid (see [`Scenario::validate`]).
    pub fn from_scenario(scenario: &Scenario) -> Self {
        let mut available = OrdMap::new();
        for r in &scenario.resources {
            available.insert(r.kind, r.amount);
        }

        let prevention_order = if scenario.algorithm == Some(AlgorithmType::Prevention) {
            scenario.prevention_priority.clone()
        } else {
            Vec::new()
        };

        Self {
            t: 0,
            available,
            procs: scenario.processes.iter().map(ProcRuntime::from_def).collect(),
            logs: Vector::new(),
            deadlock: false,
            deadlocks_count: 0,
            algorithm: scenario.algorithm,
            prevention_order,
            rr_index: 0,
            prevented_deadlocks: 0,
            manual_aborts: 0,
            wait_events: 0,
            reorder_events: 0,
            denied_unsafe: 0,
            avoidance_trace: None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════════

    /// Position of a process in the round-robin order.
    pub fn proc_index(&self, id: &ProcessId) -> Option<usize> {
        self.procs.iter().position(|p| &p.id == id)
    }

    pub fn process(&self, id: &ProcessId) -> Option<&ProcRuntime> {
        self.procs.iter().find(|p| &p.id == id)
    }

    /// Free units of `kind`.
    pub fn available_of(&self, kind: ResourceKind) -> u32 {
        self.available.get(&kind).copied().unwrap_or(0)
    }

    /// Free plus held units of `kind`. Never stored, always reconstructed.
    pub fn total_of(&self, kind: ResourceKind) -> u32 {
        self.available_of(kind) + self.procs.iter().map(|p| p.held(kind)).sum::<u32>()
    }

    /// True once every process is done.
    pub fn all_done(&self) -> bool {
        self.procs.iter().all(ProcRuntime::is_done)
    }

    /// Log entries recorded at tick `t`.
    pub fn logs_at(&self, t: Tick) -> impl Iterator<Item = &ActionLog> {
        self.logs.iter().filter(move |l| l.t == t)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Mutation primitives (used on a working copy)
    // ═══════════════════════════════════════════════════════════════════════════

    /// Return every unit held by the process at `index` to `available`.
    ///
    /// Returns the kinds that were held. Conservation is preserved: units
    /// only move between the holding map and the available pool.
    pub fn release_all(&mut self, index: usize) -> Vec<ResourceKind> {
        let Some(p) = self.procs.get_mut(index) else {
            return Vec::new();
        };
        let held = std::mem::take(&mut p.holding);
        let mut kinds = Vec::with_capacity(held.len());
        for (kind, n) in held {
            let free = self.available.get(&kind).copied().unwrap_or(0);
            self.available.insert(kind, free + n);
            kinds.push(kind);
        }
        kinds
    }

    /// Append a log entry at the current tick.
    pub fn push_log(&mut self, kind: LogKind, message: impl Into<String>) {
        self.logs.push_back(ActionLog::new(self.t, kind, message));
    }
}
