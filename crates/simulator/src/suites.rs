//! Canned scenario suites.
//!
//! Three topologies, each run under the three strategies:
//!
//! 1. **Simple cycle**: two processes request two single-unit resources in
//!    opposite orders.
//! 2. **Three-way cycle**: three processes chained over three resources.
//! 3. **Scarcity**: four processes competing for the same few units.

use crate::error::SimulatorError;
use crate::runner::{SimulationReport, Simulator};
use deadsim_types::{AlgorithmType, ResourceKind, Scenario};
use tracing::info;
use ResourceKind::*;

/// One labelled scenario.
#[derive(Debug, Clone)]
pub struct SuiteCase {
    pub label: &'static str,
    pub scenario: Scenario,
}

/// A named group of cases.
#[derive(Debug, Clone)]
pub struct Suite {
    pub name: &'static str,
    pub cases: Vec<SuiteCase>,
}

fn case(label: &'static str, scenario: Scenario) -> SuiteCase {
    SuiteCase { label, scenario }
}

fn with_processes(mut scenario: Scenario, orders: &[&[ResourceKind]]) -> Scenario {
    for (i, order) in orders.iter().enumerate() {
        let n = i + 1;
        scenario = scenario.with_process(format!("p{n}"), format!("process_{n}"), order.to_vec());
    }
    scenario
}

fn single_units(kinds: &[ResourceKind]) -> Scenario {
    kinds
        .iter()
        .fold(Scenario::new(), |s, &k| s.with_resource(k, 1))
}

pub fn simple_cycle() -> Suite {
    let crossed: &[&[ResourceKind]] = &[&[Cpu, Disk], &[Disk, Cpu]];
    let base = || single_units(&[Cpu, Disk]);

    Suite {
        name: "Simple cycle (2 processes, 2 resources)",
        cases: vec![
            case(
                "S1-P1: classic cycle (detection)",
                with_processes(base(), crossed).with_algorithm(AlgorithmType::Detection),
            ),
            case(
                "S1-P2: cycle under prevention",
                with_processes(base(), &[&[Disk, Cpu], &[Cpu, Disk]])
                    .with_algorithm(AlgorithmType::Prevention)
                    .with_prevention_priority(vec![Cpu, Disk]),
            ),
            case(
                "S1-P3: cycle under avoidance",
                with_processes(base(), crossed).with_algorithm(AlgorithmType::Avoidance),
            ),
        ],
    }
}

pub fn three_way_cycle() -> Suite {
    let chain: &[&[ResourceKind]] = &[&[Cpu, Disk], &[Disk, Mutex], &[Mutex, Cpu]];
    let base = || with_processes(single_units(&[Cpu, Disk, Mutex]), chain);

    Suite {
        name: "Three-way cycle (3 processes, 3 resources)",
        cases: vec![
            case(
                "S2-P1: 3x3 cycle (detection)",
                base().with_algorithm(AlgorithmType::Detection),
            ),
            case(
                "S2-P2: priority order breaks the cycle (prevention)",
                base()
                    .with_algorithm(AlgorithmType::Prevention)
                    .with_prevention_priority(vec![Cpu, Disk, Mutex]),
            ),
            case(
                "S2-P3: unsafe states refused (avoidance)",
                base().with_algorithm(AlgorithmType::Avoidance),
            ),
        ],
    }
}

pub fn scarcity() -> Suite {
    let three_kinds: &[&[ResourceKind]] = &[
        &[Cpu, Mutex, Disk],
        &[Mutex, Disk, Cpu],
        &[Disk, Cpu, Mutex],
        &[Cpu, Mutex, Disk],
    ];
    let base = || with_processes(single_units(&[Cpu, Disk, Mutex]), three_kinds);

    Suite {
        name: "Scarcity under high demand",
        cases: vec![
            case(
                "S3-P1: crossed orders (prevention)",
                with_processes(
                    single_units(&[Cpu, Disk]),
                    &[&[Cpu, Disk], &[Disk, Cpu], &[Cpu, Disk], &[Disk, Cpu]],
                )
                .with_algorithm(AlgorithmType::Prevention)
                .with_prevention_priority(vec![Cpu, Disk]),
            ),
            case(
                "S3-P2: three contended kinds (avoidance)",
                base().with_algorithm(AlgorithmType::Avoidance),
            ),
            case(
                "S3-P3: total order prevents circular wait (prevention)",
                base()
                    .with_algorithm(AlgorithmType::Prevention)
                    .with_prevention_priority(vec![Cpu, Mutex, Disk]),
            ),
        ],
    }
}

/// Every canned suite, in presentation order.
pub fn all_suites() -> Vec<Suite> {
    vec![simple_cycle(), three_way_cycle(), scarcity()]
}

/// Run every case of every suite.
pub fn run_suites(simulator: &Simulator) -> Result<Vec<SimulationReport>, SimulatorError> {
    let mut reports = Vec::new();
    for suite in all_suites() {
        info!(suite = suite.name, cases = suite.cases.len(), "Running suite");
        for SuiteCase { label, scenario } in &suite.cases {
            reports.push(simulator.run(label, scenario)?.report);
        }
    }
    Ok(reports)
}
