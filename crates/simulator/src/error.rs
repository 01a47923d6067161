//! Error types for the simulator.

use deadsim_types::ScenarioError;
use thiserror::Error;

/// Errors loading or running a scenario.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// Reading a scenario file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scenario file is not valid scenario JSON.
    #[error("Invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The scenario decoded but cannot be simulated.
    #[error("Invalid scenario: {0}")]
    InvalidScenario(#[from] ScenarioError),
}
