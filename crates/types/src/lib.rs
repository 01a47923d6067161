//! Domain types for the deadlock simulator.
//!
//! Static, behavior-free descriptions of the world the engine simulates:
//!
//! - [`ResourceKind`] and the [`RESOURCE_CATALOG`] describing each kind
//! - [`ResourceVector`], one amount per kind in catalog order
//! - [`ProcessDef`] and [`Scenario`], the author-time simulation input
//! - [`ScenarioError`], raised when a scenario fails validation

mod error;
mod identifiers;
mod resource;
mod scenario;

pub use error::ScenarioError;
pub use identifiers::{ProcessId, Tick};
pub use resource::{
    clamp_amount, ResourceDef, ResourceKind, ResourceQuantity, ResourceVector, KIND_COUNT,
    RESOURCE_CATALOG,
};
pub use scenario::{AlgorithmType, ProcessDef, Scenario, DEFAULT_SPEED_MS};
