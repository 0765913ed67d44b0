//! Worker backend port.

use std::fmt;

use async_trait::async_trait;

use crate::domain::Server;
use crate::error::Result;

/// Handle to a launched worker, for logging only.
///
/// The orchestrator never manages handles: readiness is established by the
/// next health probe and teardown goes through the worker's kill endpoint.
#[derive(Debug, Clone)]
pub enum WorkerHandle {
    Process { pid: Option<u32> },
    Container { id: String },
}

impl fmt::Display for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerHandle::Process { pid: Some(pid) } => write!(f, "process {pid}"),
            WorkerHandle::Process { pid: None } => f.write_str("process"),
            WorkerHandle::Container { id } => write!(f, "container {id}"),
        }
    }
}

/// Trait for mechanisms that launch a worker for a server.
///
/// `start` must be safe to call for a server already bound to its address:
/// duplicate-port races surface as the worker's own startup failure and are
/// observed as still-down on the next probe, never silently ignored.
/// Termination is not a backend concern; it goes through the HTTP kill
/// endpoint.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the worker for `server` without waiting for readiness.
    async fn start(&self, server: &Server) -> Result<WorkerHandle>;
}
