//! Running counters derived from a session.

use deadsim_core::Session;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub deadlocks: u32,
    pub manual_aborts: u32,
    pub prevented_deadlocks: u32,
    /// Sum of per-process preemption counts.
    pub preemptions_total: u32,
    pub wait_events: u32,
    pub reorder_events: u32,
    pub denied_unsafe: u32,
    /// Work spent not making progress: waits, reorders, unsafe denials and
    /// preemptions.
    pub overhead: u32,
}

pub fn get_metrics(session: &Session) -> Metrics {
    let preemptions_total = session.procs.iter().map(|p| p.preemptions).sum();
    Metrics {
        deadlocks: session.deadlocks_count,
        manual_aborts: session.manual_aborts,
        prevented_deadlocks: session.prevented_deadlocks,
        preemptions_total,
        wait_events: session.wait_events,
        reorder_events: session.reorder_events,
        denied_unsafe: session.denied_unsafe,
        overhead: session.wait_events
            + session.reorder_events
            + session.denied_unsafe
            + preemptions_total,
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "deadlocks={} aborts={} prevented={} preemptions={} waits={} reorders={} denied_unsafe={} overhead={}",
            self.deadlocks,
            self.manual_aborts,
            self.prevented_deadlocks,
            self.preemptions_total,
            self.wait_events,
            self.reorder_events,
            self.denied_unsafe,
            self.overhead
        )
    }
}
