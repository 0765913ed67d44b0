//! Subprocess worker backend.
//!
//! Launches the worker entry point as a detached OS process bound to the
//! server's netloc, with the domain object identified via environment
//! variables. Readiness is established later by a health probe; termination
//! goes through the worker's kill endpoint, so no process handle is kept.

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::SubprocessConfig;
use crate::domain::Server;
use crate::error::{BackendError, Result};
use crate::port::{Backend, WorkerHandle};

pub const OBJECT_TYPE_VAR: &str = "SERVER_OBJECT_TYPE";
pub const OBJECT_ID_VAR: &str = "SERVER_OBJECT_ID";

pub struct SubprocessBackend {
    config: SubprocessConfig,
}

impl SubprocessBackend {
    #[must_use]
    pub fn new(config: SubprocessConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Backend for SubprocessBackend {
    async fn start(&self, server: &Server) -> Result<WorkerHandle> {
        let (program, args) = self
            .config
            .command
            .split_first()
            .ok_or_else(|| BackendError::Spawn(std::io::Error::other("command is empty")))?;

        let child = Command::new(program)
            .args(args)
            .arg(&server.netloc)
            .env(OBJECT_TYPE_VAR, &server.object_type)
            .env(OBJECT_ID_VAR, &server.object_id)
            .current_dir(&self.config.working_dir)
            .spawn()
            .map_err(BackendError::Spawn)?;

        let pid = child.id();
        debug!(server = %server, pid = ?pid, "Worker process spawned");
        Ok(WorkerHandle::Process { pid })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;
    use crate::testkit::domain::test_server;

    fn backend_with_command(command: Vec<String>) -> SubprocessBackend {
        SubprocessBackend::new(SubprocessConfig {
            command,
            working_dir: PathBuf::from("."),
        })
    }

    #[tokio::test]
    async fn empty_command_is_a_spawn_error() {
        let backend = backend_with_command(vec![]);
        let server = test_server("s1", "127.0.0.1:9100");

        let err = backend.start(&server).await.unwrap_err();
        assert!(err.to_string().contains("spawn"));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let backend = backend_with_command(vec!["definitely-not-a-real-binary-4242".into()]);
        let server = test_server("s1", "127.0.0.1:9100");

        assert!(backend.start(&server).await.is_err());
    }

    #[tokio::test]
    async fn passes_netloc_and_object_env_to_the_worker() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("worker.out");

        // The netloc lands in $0 because it is appended after the -c script.
        let script = format!(
            r#"printf '%s %s %s' "$SERVER_OBJECT_TYPE" "$SERVER_OBJECT_ID" "$0" > {}"#,
            out.display()
        );
        let backend = backend_with_command(vec!["sh".into(), "-c".into(), script]);

        let mut server = test_server("s1", "127.0.0.1:9100");
        server.object_type = "warehouse".into();
        server.object_id = "42".into();

        let handle = backend.start(&server).await.unwrap();
        assert!(matches!(handle, WorkerHandle::Process { pid: Some(_) }));

        // start() does not wait for the child, so poll for its output.
        for _ in 0..50 {
            if out.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, "warehouse 42 127.0.0.1:9100");
    }
}
