//! Scenario validation errors.

use crate::{ProcessId, ResourceKind};
use thiserror::Error;

/// Reasons a scenario cannot be handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// A resource amount lies outside its catalog range.
    #[error("{kind} amount {amount} is outside the catalog range [{min}, {max}]")]
    AmountOutOfRange {
        kind: ResourceKind,
        amount: u32,
        min: u32,
        max: u32,
    },

    /// The same resource kind is configured twice.
    #[error("resource {0} is configured more than once")]
    DuplicateResource(ResourceKind),

    /// Two processes share an id.
    #[error("process id {0} is used more than once")]
    DuplicateProcess(ProcessId),

    /// A process requests a kind the scenario does not provide.
    #[error("process {process} requests {kind}, which the scenario does not provide")]
    UndeclaredResource {
        process: ProcessId,
        kind: ResourceKind,
    },

    /// The prevention priority lists a kind twice.
    #[error("prevention priority lists {0} more than once")]
    DuplicatePriority(ResourceKind),

    /// The prevention priority is not a permutation of the configured kinds.
    #[error(
        "prevention priority must order exactly the configured kinds \
         (missing: {missing:?}, unexpected: {unexpected:?})"
    )]
    PriorityNotPermutation {
        missing: Vec<ResourceKind>,
        unexpected: Vec<ResourceKind>,
    },
}
