//! Append-only action log entries.

use deadsim_types::Tick;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an action log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogKind {
    // ═══════════════════════════════════════════════════════════════════════
    // Progress
    // ═══════════════════════════════════════════════════════════════════════
    /// One unit granted to a process.
    Grant,
    /// A process completed its order and released everything.
    Finish,

    // ═══════════════════════════════════════════════════════════════════════
    // Stalls
    // ═══════════════════════════════════════════════════════════════════════
    /// At least one process could not act this tick.
    Wait,
    /// Nobody acted this tick but the strategy rules out a real deadlock.
    Info,
    /// Nobody acted this tick and no strategy protects against circular wait.
    Deadlock,

    // ═══════════════════════════════════════════════════════════════════════
    // Interventions
    // ═══════════════════════════════════════════════════════════════════════
    /// Prevention reordered or preempted a process.
    Prevention,
    /// Operator aborted a process.
    Abort,
    /// Operator force-finished a process.
    Release,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LogKind::Grant => "Grant",
            LogKind::Finish => "Finish",
            LogKind::Wait => "Wait",
            LogKind::Info => "Info",
            LogKind::Deadlock => "Deadlock",
            LogKind::Prevention => "Prevention",
            LogKind::Abort => "Abort",
            LogKind::Release => "Release",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    /// Tick the entry was recorded at.
    pub t: Tick,
    pub kind: LogKind,
    pub message: String,
}

impl ActionLog {
    pub fn new(t: Tick, kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            t,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ActionLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[t={}] {}: {}", self.t, self.kind, self.message)
    }
}
