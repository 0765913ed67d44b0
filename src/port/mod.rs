//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points of the crate. Adapters implement them
//! to integrate with external systems (the server registry, the OS process
//! table, the container runtime).

mod backend;
mod registry;

pub use backend::{Backend, WorkerHandle};
pub use registry::ServerRegistry;
