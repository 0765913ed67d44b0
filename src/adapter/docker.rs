//! Docker container backend.
//!
//! Resolves a worker image (reusing a locally labeled image, otherwise
//! building one from the fleet's build context), then resolves or creates a
//! uniquely named container for the server. Container identity makes start
//! idempotent: an existing container with the derived name is reused, never
//! recreated. Termination still goes through the worker's kill endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::container::{Config as ContainerSpec, CreateContainerOptions, StartContainerOptions};
use bollard::image::{BuildImageOptions, ListImagesOptions};
use bollard::models::HostConfig;
use bollard::Docker;
use futures_util::StreamExt;
use tracing::{debug, info};

use crate::config::ContainerConfig;
use crate::domain::Server;
use crate::error::{BackendError, Result};
use crate::port::{Backend, WorkerHandle};

use super::subprocess::{OBJECT_ID_VAR, OBJECT_TYPE_VAR};

/// Mount point of the application source inside the container.
const WORK_DIR: &str = "/mnt";

pub struct DockerBackend {
    docker: Docker,
    config: ContainerConfig,
}

impl DockerBackend {
    /// Wrap an explicitly constructed daemon handle.
    ///
    /// The handle is injected rather than created ambiently so tests can
    /// substitute a fake runtime.
    #[must_use]
    pub fn new(docker: Docker, config: ContainerConfig) -> Self {
        Self { docker, config }
    }

    /// Connect to the local daemon over its default socket.
    pub fn connect(config: ContainerConfig) -> Result<Self> {
        let docker = Docker::connect_with_socket_defaults()
            .map_err(|e| BackendError::Container(e.to_string()))?;
        Ok(Self::new(docker, config))
    }

    /// Derived container name for a server.
    #[must_use]
    pub fn container_name(&self, server: &Server) -> String {
        format!(
            "{}{}",
            self.config.container_prefix,
            server.name.to_lowercase().replace(' ', "_")
        )
    }

    fn worker_command(&self, server: &Server) -> Vec<String> {
        let mut cmd = self.config.command.clone();
        cmd.push(server.netloc.clone());
        cmd
    }

    /// Find the labeled worker image, building it if absent.
    async fn resolve_image(&self) -> Result<String> {
        let label = format!("name={}", self.config.image_label);
        let options = ListImagesOptions {
            filters: HashMap::from([("label".to_string(), vec![label.clone()])]),
            ..Default::default()
        };

        let images = self
            .docker
            .list_images(Some(options.clone()))
            .await
            .map_err(|e| BackendError::Container(e.to_string()))?;
        if let Some(image) = images.first() {
            debug!(image = %image.id, "Reusing existing worker image");
            return Ok(image.id.clone());
        }

        info!(context = %self.config.build_context.display(), "Building worker image");
        let context = self.config.build_context.clone();
        let tarball = tokio::task::spawn_blocking(move || -> std::io::Result<Vec<u8>> {
            let mut builder = tar::Builder::new(Vec::new());
            builder.append_dir_all(".", &context)?;
            builder.into_inner()
        })
        .await
        .map_err(|e| BackendError::ImageBuild(e.to_string()))?
        .map_err(|e| BackendError::ImageBuild(e.to_string()))?;

        let build_options = BuildImageOptions {
            dockerfile: "Dockerfile".to_string(),
            t: format!("{}:latest", self.config.image_label),
            labels: HashMap::from([("name".to_string(), self.config.image_label.clone())]),
            rm: true,
            forcerm: true,
            ..Default::default()
        };

        let mut built_id = None;
        let mut stream = self
            .docker
            .build_image(build_options, None, Some(tarball.into()));
        while let Some(update) = stream.next().await {
            let update = update.map_err(|e| BackendError::ImageBuild(e.to_string()))?;
            if let Some(message) = update.error {
                return Err(BackendError::ImageBuild(message).into());
            }
            if let Some(id) = update.aux.and_then(|aux| aux.id) {
                built_id = Some(id);
            }
        }
        if let Some(id) = built_id {
            return Ok(id);
        }

        // Older daemons omit the aux record; fall back to the label filter.
        let images = self
            .docker
            .list_images(Some(options))
            .await
            .map_err(|e| BackendError::Container(e.to_string()))?;
        images
            .first()
            .map(|image| image.id.clone())
            .ok_or_else(|| BackendError::ImageBuild("built image not found by label".into()).into())
    }

    /// Reuse the named container if it exists, otherwise create it.
    async fn resolve_container(&self, server: &Server, image: &str) -> Result<String> {
        let name = self.container_name(server);

        match self.docker.inspect_container(&name, None).await {
            Ok(existing) => {
                debug!(container = %name, "Reusing existing container");
                return Ok(existing.id.unwrap_or(name));
            }
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => {}
            Err(e) => return Err(BackendError::Container(e.to_string()).into()),
        }

        let spec = ContainerSpec {
            image: Some(image.to_string()),
            cmd: Some(self.worker_command(server)),
            env: Some(vec![
                format!("{OBJECT_TYPE_VAR}={}", server.object_type),
                format!("{OBJECT_ID_VAR}={}", server.object_id),
            ]),
            working_dir: Some(WORK_DIR.to_string()),
            host_config: Some(HostConfig {
                // Host networking: the worker binds its netloc directly, no
                // port mapping needed.
                network_mode: Some("host".to_string()),
                binds: Some(vec![format!(
                    "{}:{WORK_DIR}:rw",
                    self.config.build_context.display()
                )]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: name.clone(),
            ..Default::default()
        };
        let created = self
            .docker
            .create_container(Some(options), spec)
            .await
            .map_err(|e| BackendError::Container(e.to_string()))?;
        debug!(container = %name, id = %created.id, "Container created");
        Ok(created.id)
    }
}

#[async_trait]
impl Backend for DockerBackend {
    async fn start(&self, server: &Server) -> Result<WorkerHandle> {
        let image = self.resolve_image().await?;
        let id = self.resolve_container(server, &image).await?;

        let name = self.container_name(server);
        match self
            .docker
            .start_container(&name, None::<StartContainerOptions<String>>)
            .await
        {
            Ok(()) => {}
            // 304: already running.
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => {}
            Err(e) => return Err(BackendError::Container(e.to_string()).into()),
        }

        Ok(WorkerHandle::Container { id })
    }
}
