//! Deadlock prevention by global resource ordering.
//!
//! Circular wait needs at least one process to acquire resources "backwards"
//! relative to the others. Imposing a single global order on resource kinds
//! and requiring every process to acquire in non-decreasing order rules that
//! out.
//!
//! # Components
//!
//! - [`can_grant`] - the order predicate for a single request
//! - [`plan_next`] - per-process planning: request, reorder, or preempt

mod order;
mod plan;

pub use order::{can_grant, priority_index};
pub use plan::{plan_next, PreemptCause, PreventionStep};
