//! Deadlock Simulator Runner
//!
//! Drives engine sessions to completion without a user in the loop.
//!
//! # Architecture
//!
//! The runner builds on `deadsim-engine` to provide:
//!
//! - **Runs**: advance a scenario until it finishes, stalls or hits the tick limit
//! - **Recovery**: abort a victim automatically when a deadlock is declared
//! - **Suites**: the canned reference scenarios under every strategy
//! - **Configuration**: tick limit, recovery switch and victim policy
//!
//! # Example
//!
//! ```ignore
//! use deadsim_simulator::{suites, RunConfig, Simulator, VictimPolicy};
//!
//! let config = RunConfig::new()
//!     .with_max_ticks(200)
//!     .with_victim_policy(VictimPolicy::MostHeld);
//! let simulator = Simulator::new(config);
//!
//! for report in suites::run_suites(&simulator)? {
//!     println!("{report}");
//! }
//! ```

pub mod config;
pub mod error;
pub mod runner;
pub mod suites;

pub use config::{RunConfig, VictimPolicy};
pub use error::SimulatorError;
pub use runner::{
    load_scenario, parse_scenario, select_victim, SimulationReport, SimulationRun, Simulator,
};
pub use suites::{all_suites, run_suites, Suite, SuiteCase};
