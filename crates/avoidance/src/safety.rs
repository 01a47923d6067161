//! The banker's safety check.

use crate::Matrices;
use deadsim_core::{Matrix, SafetyStep};
use deadsim_types::{ProcessId, ResourceVector};
use std::collections::HashSet;

/// Result of a safety check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyOutcome {
    /// True if every process can complete in some order.
    pub safe: bool,
    /// Work-vector trajectory; on an unsafe run the last step is the final
    /// work vector with no finished process.
    pub steps: Vec<SafetyStep>,
    /// Completion order found, ties broken by process-list order.
    pub sequence: Vec<ProcessId>,
}

/// Run the banker's safety check.
///
/// Starting from `work = available`, repeatedly scan the unfinished
/// processes in `proc_ids` order and let any process whose need fits in
/// `work` complete, returning its allocation to `work`. Processes whose need
/// and allocation are both zero count as finished from the start. The state
/// is safe iff every process completes.
///
/// Rows missing from `allocation` or `need` are treated as zero.
pub fn safety_check(
    available: &ResourceVector,
    allocation: &Matrix,
    need: &Matrix,
    proc_ids: &[ProcessId],
) -> SafetyOutcome {
    let mut work = *available;
    let mut steps = Vec::new();
    let mut sequence = Vec::new();

    let mut finished: HashSet<&ProcessId> = proc_ids
        .iter()
        .filter(|id| {
            Matrices::row(need, id).is_zero() && Matrices::row(allocation, id).is_zero()
        })
        .collect();

    let mut progressed = true;
    while progressed {
        progressed = false;
        for id in proc_ids {
            if finished.contains(id) {
                continue;
            }
            if Matrices::row(need, id).le(&work) {
                work = work.plus(&Matrices::row(allocation, id));
                steps.push(SafetyStep {
                    work,
                    finished: Some(id.clone()),
                });
                finished.insert(id);
                sequence.push(id.clone());
                progressed = true;
            }
        }
    }

    let safe = proc_ids.iter().all(|id| finished.contains(id));
    if !safe {
        steps.push(SafetyStep {
            work,
            finished: None,
        });
    }

    SafetyOutcome {
        safe,
        steps,
        sequence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadsim_types::ResourceKind::*;

    fn vec3(a: u32, b: u32, c: u32) -> ResourceVector {
        ResourceVector::from_pairs([(Cpu, a), (Disk, b), (Net, c)])
    }

    fn matrix(rows: &[(&str, ResourceVector)]) -> Matrix {
        rows.iter()
            .map(|(id, v)| (ProcessId::from(*id), *v))
            .collect()
    }

    fn ids(names: &[&str]) -> Vec<ProcessId> {
        names.iter().map(|&n| ProcessId::from(n)).collect()
    }

    /// The classic five-process, three-kind instance.
    fn textbook() -> (ResourceVector, Matrix, Matrix, Vec<ProcessId>) {
        let allocation = matrix(&[
            ("P0", vec3(0, 1, 0)),
            ("P1", vec3(2, 0, 0)),
            ("P2", vec3(3, 0, 2)),
            ("P3", vec3(2, 1, 1)),
            ("P4", vec3(0, 0, 2)),
        ]);
        let need = matrix(&[
            ("P0", vec3(7, 4, 3)),
            ("P1", vec3(1, 2, 2)),
            ("P2", vec3(6, 0, 0)),
            ("P3", vec3(0, 1, 1)),
            ("P4", vec3(4, 3, 1)),
        ]);
        (
            vec3(3, 3, 2),
            allocation,
            need,
            ids(&["P0", "P1", "P2", "P3", "P4"]),
        )
    }

    #[test]
    fn test_textbook_instance_is_safe() {
        let (available, allocation, need, proc_ids) = textbook();
        let outcome = safety_check(&available, &allocation, &need, &proc_ids);

        assert!(outcome.safe);
        assert_eq!(outcome.sequence, ids(&["P1", "P3", "P4", "P0", "P2"]));
        assert_eq!(outcome.steps.len(), 5);
        assert_eq!(outcome.steps.last().unwrap().work, vec3(10, 5, 7));
    }

    #[test]
    fn test_textbook_sequence_replays() {
        let (available, allocation, need, proc_ids) = textbook();
        let outcome = safety_check(&available, &allocation, &need, &proc_ids);

        let mut work = available;
        for id in &outcome.sequence {
            assert!(
                need[id].le(&work),
                "{} needs {} but only {} is free",
                id,
                need[id],
                work
            );
            work = work.plus(&allocation[id]);
        }
        assert_eq!(outcome.sequence.len(), proc_ids.len());
    }

    #[test]
    fn test_unsafe_state() {
        let allocation = matrix(&[("A", vec3(1, 0, 0)), ("B", vec3(0, 1, 0))]);
        let need = matrix(&[("A", vec3(0, 1, 0)), ("B", vec3(1, 0, 0))]);
        let outcome = safety_check(&ResourceVector::zero(), &allocation, &need, &ids(&["A", "B"]));

        assert!(!outcome.safe);
        assert!(outcome.sequence.is_empty());
        assert_eq!(
            outcome.steps,
            vec![SafetyStep {
                work: ResourceVector::zero(),
                finished: None
            }]
        );
    }

    #[test]
    fn test_partial_progress_then_stuck() {
        let allocation = matrix(&[
            ("A", vec3(1, 0, 0)),
            ("B", vec3(0, 1, 0)),
            ("C", vec3(0, 0, 0)),
        ]);
        let need = matrix(&[
            ("A", vec3(0, 0, 2)),
            ("B", vec3(0, 0, 2)),
            ("C", vec3(0, 0, 1)),
        ]);
        let outcome = safety_check(&vec3(0, 0, 1), &allocation, &need, &ids(&["A", "B", "C"]));

        assert!(!outcome.safe);
        assert_eq!(outcome.sequence, ids(&["C"]));
        assert_eq!(outcome.steps.len(), 2);
        assert_eq!(outcome.steps[1].finished, None);
    }

    #[test]
    fn test_idle_processes_are_prefinished() {
        let allocation = matrix(&[("idle", ResourceVector::zero())]);
        let need = matrix(&[("idle", ResourceVector::zero())]);
        let outcome = safety_check(&ResourceVector::zero(), &allocation, &need, &ids(&["idle"]));

        assert!(outcome.safe);
        assert!(outcome.sequence.is_empty());
        assert!(outcome.steps.is_empty());
    }

    #[test]
    fn test_sequence_uses_list_order_on_ties() {
        let allocation = matrix(&[("B", vec3(1, 0, 0)), ("A", vec3(1, 0, 0))]);
        let need = matrix(&[("B", vec3(1, 0, 0)), ("A", vec3(1, 0, 0))]);
        let outcome = safety_check(&vec3(1, 0, 0), &allocation, &need, &ids(&["B", "A"]));

        assert!(outcome.safe);
        assert_eq!(outcome.sequence, ids(&["B", "A"]));
    }
}
