//! Server registry port.
//!
//! The durable store of [`Server`] records is an external collaborator; the
//! orchestrator only needs to list the fleet each cycle and persist the
//! refreshed status. Every registry update is a single atomic field write
//! per server, so a concurrent reader (e.g. an admin UI) never observes a
//! partial record.

use async_trait::async_trait;

use crate::domain::{Server, ServerId, Status};
use crate::error::Result;

/// Read/write access to the fleet's server records.
#[async_trait]
pub trait ServerRegistry: Send + Sync {
    /// List every currently known server, each exactly once.
    async fn list_all(&self) -> Result<Vec<Server>>;

    /// Persist the observed status for one server.
    async fn update_status(&self, id: &ServerId, status: Status) -> Result<()>;
}
