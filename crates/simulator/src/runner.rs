//! Scenario runner.

use crate::config::{RunConfig, VictimPolicy};
use crate::error::SimulatorError;
use deadsim_core::Session;
use deadsim_engine::{abort_process, advance, get_metrics, initialize, Metrics};
use deadsim_types::{AlgorithmType, ProcessId, Scenario};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

/// Summary of one scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub label: String,
    pub algorithm: Option<AlgorithmType>,
    /// Tick the session ended on.
    pub ticks: u64,
    /// True if every process finished.
    pub completed: bool,
    /// Processes aborted by the runner.
    pub aborted: u32,
    pub metrics: Metrics,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let algorithm = self.algorithm.map_or("N/A", AlgorithmType::name);
        writeln!(f, ">>> {}", self.label)?;
        writeln!(f, "  algorithm:           {}", algorithm)?;
        writeln!(f, "  ticks:               {}", self.ticks)?;
        writeln!(f, "  completed:           {}", self.completed)?;
        writeln!(f, "  deadlocks detected:  {}", self.metrics.deadlocks)?;
        writeln!(f, "  deadlocks prevented: {}", self.metrics.prevented_deadlocks)?;
        writeln!(f, "  aborted:             {}", self.aborted)?;
        writeln!(f, "  waits:               {}", self.metrics.wait_events)?;
        writeln!(f, "  reorders:            {}", self.metrics.reorder_events)?;
        writeln!(f, "  denied unsafe:       {}", self.metrics.denied_unsafe)?;
        write!(f, "  overhead:            {}", self.metrics.overhead)
    }
}

/// Final session plus its report.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub session: Session,
    pub report: SimulationReport,
}

/// Drives sessions to completion under a [`RunConfig`].
pub struct Simulator {
    config: RunConfig,
}

impl Simulator {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run `scenario` until every process is done, the tick limit is reached,
    /// or a deadlock is declared with automatic aborts disabled.
    ///
    /// On a deadlock with automatic aborts enabled, a victim chosen by the
    /// configured [`VictimPolicy`] is aborted and the run continues.
    pub fn run(&self, label: &str, scenario: &Scenario) -> Result<SimulationRun, SimulatorError> {
        scenario.validate()?;

        let mut session = initialize(scenario);
        let mut aborted = 0u32;

        while session.t < self.config.max_ticks {
            let before = session.t;
            session = advance(&session);

            if session.all_done() {
                break;
            }

            if session.deadlock {
                warn!(label, tick = session.t, "Deadlock");
                if !self.config.auto_abort_on_deadlock {
                    break;
                }
                let Some(victim) = select_victim(&session, self.config.victim_policy) else {
                    break;
                };
                info!(label, tick = session.t, victim = %victim, "Aborting victim");
                session = abort_process(&session, &victim);
                aborted += 1;
            }

            if session.t == before {
                break;
            }
        }

        let report = SimulationReport {
            label: label.to_string(),
            algorithm: session.algorithm,
            ticks: session.t,
            completed: session.all_done(),
            aborted,
            metrics: get_metrics(&session),
        };
        info!(
            label,
            ticks = report.ticks,
            completed = report.completed,
            aborted,
            "Run finished"
        );

        Ok(SimulationRun { session, report })
    }
}

/// Pick the process to abort.
pub fn select_victim(session: &Session, policy: VictimPolicy) -> Option<ProcessId> {
    let mut unfinished = session.procs.iter().filter(|p| !p.is_done());
    let victim = match policy {
        VictimPolicy::FirstUnfinished => unfinished.next(),
        // First in order wins ties
        VictimPolicy::MostHeld => unfinished.fold(None, |best, p| {
            let held: u32 = p.holding.values().sum();
            match best {
                Some((_, most)) if most >= held => best,
                _ => Some((p, held)),
            }
        })
        .map(|(p, _)| p),
    };
    victim.map(|p| p.id.clone())
}

/// Decode a scenario from JSON and validate it.
pub fn parse_scenario(json: &str) -> Result<Scenario, SimulatorError> {
    let scenario: Scenario = serde_json::from_str(json)?;
    scenario.validate()?;
    Ok(scenario)
}

/// Read, decode and validate a scenario file.
pub fn load_scenario(path: &Path) -> Result<Scenario, SimulatorError> {
    let json = std::fs::read_to_string(path)?;
    parse_scenario(&json)
}
