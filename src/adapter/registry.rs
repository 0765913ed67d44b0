//! In-memory server registry.
//!
//! Deployment stand-in for the external durable registry, seeded from the
//! `[[fleet]]` tables of the config file. Status updates are a single write
//! under the lock, so a concurrent reader never sees a partial record.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::{Server, ServerId, Status};
use crate::error::{Error, Result};
use crate::port::ServerRegistry;

pub struct InMemoryRegistry {
    servers: RwLock<BTreeMap<ServerId, Server>>,
}

impl InMemoryRegistry {
    #[must_use]
    pub fn from_servers(servers: Vec<Server>) -> Self {
        Self {
            servers: RwLock::new(
                servers
                    .into_iter()
                    .map(|server| (server.id.clone(), server))
                    .collect(),
            ),
        }
    }

    /// Current status of one server, if known.
    #[must_use]
    pub fn status_of(&self, id: &ServerId) -> Option<Status> {
        self.servers.read().get(id).map(|s| s.last_known_status)
    }
}

#[async_trait]
impl ServerRegistry for InMemoryRegistry {
    async fn list_all(&self) -> Result<Vec<Server>> {
        Ok(self.servers.read().values().cloned().collect())
    }

    async fn update_status(&self, id: &ServerId, status: Status) -> Result<()> {
        let mut servers = self.servers.write();
        let server = servers
            .get_mut(id)
            .ok_or_else(|| Error::Registry(format!("unknown server id '{id}'")))?;
        server.last_known_status = status;
        Ok(())
    }
}
