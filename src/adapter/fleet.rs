//! Backend dispatch across the closed set of backend kinds.

use async_trait::async_trait;
#[cfg(feature = "container")]
use tracing::warn;

use crate::config::Config;
use crate::domain::{BackendKind, Server};
use crate::error::{BackendError, Result};
use crate::port::{Backend, WorkerHandle};

use super::subprocess::SubprocessBackend;

#[cfg(feature = "container")]
use super::docker::DockerBackend;

/// Production backend: routes each server to the backend its record names.
///
/// The set of kinds is closed ([`BackendKind`]), so adding a backend means
/// extending the enum and this dispatch - both exhaustively checked.
pub struct FleetBackend {
    subprocess: SubprocessBackend,
    #[cfg(feature = "container")]
    container: Option<DockerBackend>,
}

impl FleetBackend {
    /// Build the backends the configured fleet actually needs.
    pub fn from_config(config: &Config) -> Self {
        let subprocess = SubprocessBackend::new(config.subprocess.clone());

        #[cfg(feature = "container")]
        let container = if config
            .fleet
            .iter()
            .any(|s| s.backend == BackendKind::Container)
        {
            match DockerBackend::connect(config.container.clone()) {
                Ok(backend) => Some(backend),
                Err(e) => {
                    warn!(error = %e, "Container runtime unavailable; container servers will not start");
                    None
                }
            }
        } else {
            None
        };

        Self {
            subprocess,
            #[cfg(feature = "container")]
            container,
        }
    }
}

#[async_trait]
impl Backend for FleetBackend {
    async fn start(&self, server: &Server) -> Result<WorkerHandle> {
        match server.backend {
            BackendKind::Subprocess => self.subprocess.start(server).await,
            #[cfg(feature = "container")]
            BackendKind::Container => match &self.container {
                Some(docker) => docker.start(server).await,
                None => Err(BackendError::ContainerUnavailable.into()),
            },
            #[cfg(not(feature = "container"))]
            BackendKind::Container => Err(BackendError::ContainerUnavailable.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::test_server;

    #[tokio::test]
    async fn container_server_without_runtime_fails_per_attempt() {
        let backend = FleetBackend {
            subprocess: SubprocessBackend::new(Default::default()),
            #[cfg(feature = "container")]
            container: None,
        };

        let mut server = test_server("wh-1", "127.0.0.1:9100");
        server.backend = BackendKind::Container;

        let err = backend.start(&server).await.unwrap_err();
        assert!(!err.is_fatal());
    }
}
