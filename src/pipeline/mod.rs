// Turn pipeline - detect, pivot, predict, answer, localize

pub mod orchestrator;
pub mod types;

#[cfg(test)]
pub(crate) mod stubs;

pub use orchestrator::Pipeline;
pub use types::*;
