//! Fake backend for loop tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Server, ServerId};
use crate::error::{BackendError, Result};
use crate::port::{Backend, WorkerHandle};

type StartEffect = Box<dyn Fn() + Send + Sync>;

/// Records every start call; can fail specific servers and run a side
/// effect (e.g. bring a stub worker online) when a server is started.
#[derive(Default)]
pub struct RecordingBackend {
    started: Mutex<Vec<ServerId>>,
    failing: Mutex<HashSet<ServerId>>,
    effects: Mutex<HashMap<ServerId, StartEffect>>,
}

impl RecordingBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `start` fail for this server with a spawn error.
    pub fn fail_for(&self, id: ServerId) {
        self.failing.lock().insert(id);
    }

    /// Run `effect` whenever this server is started.
    pub fn on_start(&self, id: ServerId, effect: impl Fn() + Send + Sync + 'static) {
        self.effects.lock().insert(id, Box::new(effect));
    }

    /// Servers started so far, in call order.
    #[must_use]
    pub fn started(&self) -> Vec<ServerId> {
        self.started.lock().clone()
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn start(&self, server: &Server) -> Result<WorkerHandle> {
        if self.failing.lock().contains(&server.id) {
            return Err(BackendError::Spawn(std::io::Error::other("scripted failure")).into());
        }

        self.started.lock().push(server.id.clone());
        if let Some(effect) = self.effects.lock().get(&server.id) {
            effect();
        }
        Ok(WorkerHandle::Process { pid: Some(4242) })
    }
}
