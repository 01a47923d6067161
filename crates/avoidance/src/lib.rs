//! Deadlock avoidance with the banker's algorithm.
//!
//! Before a unit is granted, the engine asks whether the resulting state is
//! still *safe*: whether some order exists in which every process can obtain
//! its remaining claim and finish. Grants that would leave no such order are
//! deferred.
//!
//! # Components
//!
//! - [`build_matrices`] - Allocation/Max/Need/Available derived from a session
//! - [`safety_check`] - the banker's safety check over those matrices
//! - [`simulate_grant_and_check_safe`] - one hypothetical grant, with a full
//!   [`SafetyTrace`](deadsim_core::SafetyTrace) for inspection

mod grant;
mod matrices;
mod safety;

pub use grant::{is_safe_state, simulate_grant_and_check_safe, GrantCheck};
pub use matrices::{build_matrices, Matrices};
pub use safety::{safety_check, SafetyOutcome};
