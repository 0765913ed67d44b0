//! Implementations of ports (hexagonal adapters).

#[cfg(feature = "container")]
mod docker;
mod fleet;
mod registry;
mod subprocess;

#[cfg(feature = "container")]
pub use docker::DockerBackend;
pub use fleet::FleetBackend;
pub use registry::InMemoryRegistry;
pub use subprocess::{SubprocessBackend, OBJECT_ID_VAR, OBJECT_TYPE_VAR};
