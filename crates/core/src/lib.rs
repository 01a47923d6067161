//! Core simulation state for the deadlock simulator.
//!
//! This crate holds the data the engine transforms and the collaborator
//! renders:
//!
//! - [`Session`]: the whole simulation state at one tick
//! - [`ProcRuntime`]: per-process cursor, holdings and lifecycle
//! - [`ActionLog`]: append-only, timestamped log lines
//! - [`SafetyTrace`]: the record of one banker's-algorithm decision
//!
//! It contains no decision logic; see `deadsim-engine`.

mod log;
mod session;
mod trace;

pub use log::{ActionLog, LogKind};
pub use session::{ProcRuntime, ProcState, Session};
pub use trace::{HypotheticalState, Matrix, RejectReason, SafetyStep, SafetyTrace};
