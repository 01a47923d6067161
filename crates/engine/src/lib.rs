//! Deadlock simulation engine.
//!
//! A deterministic, tick-based step function over [`Session`] snapshots.
//!
//! # Design
//!
//! - **Synchronous**: no async, no I/O, no wall-clock time
//! - **Deterministic**: the same session always advances to the same session
//! - **Value semantics**: every operation returns a new snapshot; callers may
//!   keep old snapshots around for history or undo
//!
//! The engine picks a [`Strategy`] from the session's algorithm, visits
//! processes round-robin and applies at most one allocation change per tick.
//!
//! [`Session`]: deadsim_core::Session

mod graph;
mod metrics;
mod strategy;
mod transition;

pub use graph::{build_graph, Edge, EdgeKind, ProcessNode, ResourceGraph, ResourceNode};
pub use metrics::{get_metrics, Metrics};
pub use strategy::{Decision, Strategy, WaitReason};
pub use transition::{abort_process, advance, initialize, release_process};
