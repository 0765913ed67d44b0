//! Registry wrapper that fails status writes on demand.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::adapter::InMemoryRegistry;
use crate::domain::{Server, ServerId, Status};
use crate::error::{Error, Result};
use crate::port::ServerRegistry;

pub struct FlakyRegistry {
    inner: InMemoryRegistry,
    fail_updates: AtomicBool,
}

impl FlakyRegistry {
    #[must_use]
    pub fn from_servers(servers: Vec<Server>) -> Self {
        Self {
            inner: InMemoryRegistry::from_servers(servers),
            fail_updates: AtomicBool::new(false),
        }
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn status_of(&self, id: &ServerId) -> Option<Status> {
        self.inner.status_of(id)
    }
}

#[async_trait]
impl ServerRegistry for FlakyRegistry {
    async fn list_all(&self) -> Result<Vec<Server>> {
        self.inner.list_all().await
    }

    async fn update_status(&self, id: &ServerId, status: Status) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(Error::Registry("scripted write failure".into()));
        }
        self.inner.update_status(id, status).await
    }
}
