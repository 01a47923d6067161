//! Scenario definition and editing.
//!
//! A [`Scenario`] is the author-time input to the engine: how many units of
//! each resource exist, which processes compete for them and in what order
//! they request, and which deadlock strategy governs the run.
//!
//! The editing methods mirror the actions of a scenario editor. None of them
//! validate the scenario as a whole; call [`Scenario::validate`] before
//! handing it to the engine.

use crate::{clamp_amount, ProcessId, ResourceKind, ResourceQuantity, ScenarioError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default display pacing between ticks, in milliseconds.
///
/// Display-only: the engine has no notion of wall-clock time.
pub const DEFAULT_SPEED_MS: u64 = 300;

fn default_speed_ms() -> u64 {
    DEFAULT_SPEED_MS
}

/// Deadlock handling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmType {
    /// Impose a global acquisition order on resource kinds.
    Prevention,
    /// Grant only requests that keep the system in a safe state.
    Avoidance,
    /// Let processes run freely and report a stall as a deadlock.
    Detection,
}

impl AlgorithmType {
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmType::Prevention => "PREVENTION",
            AlgorithmType::Avoidance => "AVOIDANCE",
            AlgorithmType::Detection => "DETECTION",
        }
    }
}

impl std::fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A process definition.
///
/// The allocation order is both the request sequence (one unit per entry,
/// repeats allowed) and the process's declared maximum claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDef {
    pub id: ProcessId,
    pub name: String,
    pub allocation_order: Vec<ResourceKind>,
}

impl ProcessDef {
    pub fn new(
        id: impl Into<ProcessId>,
        name: impl Into<String>,
        allocation_order: Vec<ResourceKind>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            allocation_order,
        }
    }
}

/// Author-time simulation input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Total units per configured kind.
    pub resources: Vec<ResourceQuantity>,

    /// Competing processes, in round-robin order.
    pub processes: Vec<ProcessDef>,

    /// Selected strategy; `None` runs without any deadlock handling.
    pub algorithm: Option<AlgorithmType>,

    /// Global acquisition order, only meaningful under
    /// [`AlgorithmType::Prevention`].
    #[serde(default)]
    pub prevention_priority: Vec<ResourceKind>,

    /// Display pacing between ticks.
    #[serde(default = "default_speed_ms")]
    pub speed_ms: u64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Create a scenario with no resources and no processes.
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            processes: Vec::new(),
            algorithm: None,
            prevention_priority: Vec::new(),
            speed_ms: DEFAULT_SPEED_MS,
        }
    }

    /// Create the editor's starting scenario: every catalog kind at its
    /// minimum amount, no processes, no algorithm.
    pub fn empty() -> Self {
        Self {
            resources: ResourceKind::ALL
                .iter()
                .map(|&k| ResourceQuantity::new(k, k.def().min))
                .collect(),
            ..Self::new()
        }
    }

    /// Add (or overwrite) a resource amount, as given.
    pub fn with_resource(mut self, kind: ResourceKind, amount: u32) -> Self {
        self.put_resource(kind, amount);
        self
    }

    /// Append a process.
    pub fn with_process(
        mut self,
        id: impl Into<ProcessId>,
        name: impl Into<String>,
        allocation_order: Vec<ResourceKind>,
    ) -> Self {
        self.processes
            .push(ProcessDef::new(id, name, allocation_order));
        self
    }

    /// Set the strategy.
    pub fn with_algorithm(mut self, algorithm: AlgorithmType) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the prevention priority order.
    pub fn with_prevention_priority(mut self, order: Vec<ResourceKind>) -> Self {
        self.prevention_priority = order;
        self
    }

    /// Set the display pacing.
    pub fn with_speed_ms(mut self, speed_ms: u64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Editing
    // ═══════════════════════════════════════════════════════════════════════════

    /// Set a resource amount, clamped into its catalog range.
    pub fn set_resource(&mut self, kind: ResourceKind, amount: u32) {
        self.put_resource(kind, clamp_amount(kind, amount));
    }

    fn put_resource(&mut self, kind: ResourceKind, amount: u32) {
        match self.resources.iter_mut().find(|r| r.kind == kind) {
            Some(r) => r.amount = amount,
            None => self.resources.push(ResourceQuantity::new(kind, amount)),
        }
    }

    /// Append a process. Rejects a duplicate id.
    pub fn add_process(&mut self, process: ProcessDef) -> Result<(), ScenarioError> {
        if self.process(&process.id).is_some() {
            return Err(ScenarioError::DuplicateProcess(process.id));
        }
        self.processes.push(process);
        Ok(())
    }

    /// Remove a process by id, returning it if it existed.
    pub fn remove_process(&mut self, id: &ProcessId) -> Option<ProcessDef> {
        let idx = self.processes.iter().position(|p| &p.id == id)?;
        Some(self.processes.remove(idx))
    }

    /// Move the process at `from` to position `to`.
    ///
    /// Returns false and leaves the scenario unchanged if either index is out
    /// of range.
    pub fn move_process(&mut self, from: usize, to: usize) -> bool {
        let len = self.processes.len();
        if from >= len || to >= len {
            return false;
        }
        let moved = self.processes.remove(from);
        self.processes.insert(to, moved);
        true
    }

    /// Select a strategy, or none.
    pub fn set_algorithm(&mut self, algorithm: Option<AlgorithmType>) {
        self.algorithm = algorithm;
    }

    /// Replace the prevention priority order.
    pub fn set_prevention_priority(&mut self, order: Vec<ResourceKind>) {
        self.prevention_priority = order;
    }

    /// Set the display pacing.
    pub fn set_speed_ms(&mut self, speed_ms: u64) {
        self.speed_ms = speed_ms;
    }

    /// Drop the strategy together with its priority order.
    pub fn clear_algorithm(&mut self) {
        self.algorithm = None;
        self.prevention_priority.clear();
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Queries
    // ═══════════════════════════════════════════════════════════════════════════

    /// Look up a process by id.
    pub fn process(&self, id: &ProcessId) -> Option<&ProcessDef> {
        self.processes.iter().find(|p| &p.id == id)
    }

    /// Configured amount of `kind` (zero if not configured).
    pub fn amount(&self, kind: ResourceKind) -> u32 {
        self.resources
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.amount)
            .sum()
    }

    /// Kinds with a positive amount, in catalog order.
    pub fn used_kinds(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .iter()
            .copied()
            .filter(|&k| self.amount(k) > 0)
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════════════════════

    /// Check that the scenario is structurally valid for the engine.
    ///
    /// - every amount lies within its catalog range, each kind configured once
    /// - process ids are unique
    /// - every requested kind is configured with a positive amount
    /// - under Prevention, the priority order is a permutation of exactly the
    ///   kinds with a positive amount
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let mut seen_kinds = BTreeSet::new();
        for r in &self.resources {
            if !seen_kinds.insert(r.kind) {
                return Err(ScenarioError::DuplicateResource(r.kind));
            }
            let def = r.kind.def();
            if !def.contains(r.amount) {
                return Err(ScenarioError::AmountOutOfRange {
                    kind: r.kind,
                    amount: r.amount,
                    min: def.min,
                    max: def.max,
                });
            }
        }

        let used: BTreeSet<ResourceKind> = self.used_kinds().into_iter().collect();

        let mut seen_ids = BTreeSet::new();
        for p in &self.processes {
            if !seen_ids.insert(&p.id) {
                return Err(ScenarioError::DuplicateProcess(p.id.clone()));
            }
            if let Some(&kind) = p.allocation_order.iter().find(|k| !used.contains(k)) {
                return Err(ScenarioError::UndeclaredResource {
                    process: p.id.clone(),
                    kind,
                });
            }
        }

        if self.algorithm == Some(AlgorithmType::Prevention) {
            let mut ordered = BTreeSet::new();
            for &k in &self.prevention_priority {
                if !ordered.insert(k) {
                    return Err(ScenarioError::DuplicatePriority(k));
                }
            }
            if ordered != used {
                return Err(ScenarioError::PriorityNotPermutation {
                    missing: used.difference(&ordered).copied().collect(),
                    unexpected: ordered.difference(&used).copied().collect(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ResourceKind::*;

    fn two_cycle() -> Scenario {
        Scenario::new()
            .with_resource(Cpu, 1)
            .with_resource(Disk, 1)
            .with_process("p1", "proc_1", vec![Cpu, Disk])
            .with_process("p2", "proc_2", vec![Disk, Cpu])
    }

    #[test]
    fn test_empty_scenario_uses_catalog_minimums() {
        let s = Scenario::empty();
        assert_eq!(s.resources.len(), ResourceKind::ALL.len());
        assert!(s.resources.iter().all(|r| r.amount == r.kind.def().min));
        assert!(s.processes.is_empty());
        assert_eq!(s.algorithm, None);
        assert_eq!(s.speed_ms, DEFAULT_SPEED_MS);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_set_resource_clamps() {
        let mut s = Scenario::empty();
        s.set_resource(Cpu, 99);
        assert_eq!(s.amount(Cpu), 16);
        s.set_resource(Cpu, 0);
        assert_eq!(s.amount(Cpu), 1);
    }

    #[test]
    fn test_add_remove_move_process() {
        let mut s = two_cycle();

        let dup = ProcessDef::new("p1", "again", vec![Cpu]);
        assert_eq!(
            s.add_process(dup),
            Err(ScenarioError::DuplicateProcess(ProcessId::from("p1")))
        );

        s.add_process(ProcessDef::new("p3", "proc_3", vec![Cpu]))
            .unwrap();
        assert!(s.move_process(2, 0));
        assert_eq!(s.processes[0].id.as_str(), "p3");

        // Out of range target leaves the order alone
        assert!(!s.move_process(0, 3));
        assert_eq!(s.processes[0].id.as_str(), "p3");

        let removed = s.remove_process(&ProcessId::from("p1")).unwrap();
        assert_eq!(removed.name, "proc_1");
        assert!(s.remove_process(&ProcessId::from("p1")).is_none());
        assert_eq!(s.processes.len(), 2);
    }

    #[test]
    fn test_clear_algorithm_drops_priority() {
        let mut s = two_cycle()
            .with_algorithm(AlgorithmType::Prevention)
            .with_prevention_priority(vec![Cpu, Disk]);
        s.clear_algorithm();
        assert_eq!(s.algorithm, None);
        assert!(s.prevention_priority.is_empty());
    }

    #[test]
    fn test_validate_prevention_priority() {
        let base = two_cycle().with_algorithm(AlgorithmType::Prevention);

        assert!(base
            .clone()
            .with_prevention_priority(vec![Disk, Cpu])
            .validate()
            .is_ok());

        assert_eq!(
            base.clone()
                .with_prevention_priority(vec![Cpu])
                .validate(),
            Err(ScenarioError::PriorityNotPermutation {
                missing: vec![Disk],
                unexpected: vec![],
            })
        );

        assert_eq!(
            base.clone()
                .with_prevention_priority(vec![Cpu, Disk, Cpu])
                .validate(),
            Err(ScenarioError::DuplicatePriority(Cpu))
        );

        assert!(matches!(
            base.with_prevention_priority(vec![Cpu, Disk, Net]).validate(),
            Err(ScenarioError::PriorityNotPermutation { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let s = two_cycle().with_resource(Cpu, 17);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::AmountOutOfRange { kind: Cpu, .. })
        ));

        let s = two_cycle().with_process("p1", "copy", vec![Cpu]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::DuplicateProcess(_))
        ));

        let s = two_cycle().with_process("p3", "proc_3", vec![Mutex]);
        assert!(matches!(
            s.validate(),
            Err(ScenarioError::UndeclaredResource { kind: Mutex, .. })
        ));
    }

    #[test]
    fn test_priority_ignored_outside_prevention() {
        let s = two_cycle()
            .with_algorithm(AlgorithmType::Detection)
            .with_prevention_priority(vec![Net]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_scenario_json_defaults() {
        let json = r#"{
            "resources": [{"kind": "CPU", "amount": 2}],
            "processes": [{"id": "p1", "name": "worker", "allocation_order": ["CPU", "CPU"]}],
            "algorithm": "AVOIDANCE"
        }"#;
        let s: Scenario = serde_json::from_str(json).unwrap();
        assert_eq!(s.algorithm, Some(AlgorithmType::Avoidance));
        assert_eq!(s.speed_ms, DEFAULT_SPEED_MS);
        assert!(s.prevention_priority.is_empty());
        assert!(s.validate().is_ok());
    }
}
