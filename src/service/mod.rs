//! Cross-cutting services - the probe client and the reconciliation loop.

mod orchestrator;
mod probe;

pub use orchestrator::Orchestrator;
pub use probe::ProbeClient;
