//! Configuration for scenario runs.

use std::fmt;
use std::str::FromStr;

/// How the runner picks the process to abort when a deadlock is declared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VictimPolicy {
    /// The first process in round-robin order that has not finished.
    #[default]
    FirstUnfinished,

    /// The unfinished process holding the most units, first in order on ties.
    /// Frees the most capacity per abort.
    MostHeld,
}

impl fmt::Display for VictimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VictimPolicy::FirstUnfinished => write!(f, "first-unfinished"),
            VictimPolicy::MostHeld => write!(f, "most-held"),
        }
    }
}

impl FromStr for VictimPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-unfinished" | "first" => Ok(VictimPolicy::FirstUnfinished),
            "most-held" | "most" => Ok(VictimPolicy::MostHeld),
            _ => Err(format!("Unknown victim policy: {}", s)),
        }
    }
}

/// Configuration for a single scenario run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Stop once the session reaches this tick.
    pub max_ticks: u64,

    /// Abort a victim and keep going when a deadlock is declared. When off,
    /// the run stops at the first deadlock.
    pub auto_abort_on_deadlock: bool,

    /// Victim selection for automatic aborts.
    pub victim_policy: VictimPolicy,
}

impl RunConfig {
    pub fn new() -> Self {
        Self {
            max_ticks: 500,
            auto_abort_on_deadlock: true,
            victim_policy: VictimPolicy::default(),
        }
    }

    /// Set the tick limit.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Enable or disable automatic aborts on deadlock.
    pub fn with_auto_abort(mut self, enabled: bool) -> Self {
        self.auto_abort_on_deadlock = enabled;
        self
    }

    /// Set the victim selection policy.
    pub fn with_victim_policy(mut self, policy: VictimPolicy) -> Self {
        self.victim_policy = policy;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}
