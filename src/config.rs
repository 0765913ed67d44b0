//! Configuration loading and validation.
//!
//! Configuration comes from a TOML file with sections for logging, the
//! orchestrator timings, the two backends, and the `[[fleet]]` tables that
//! seed the server registry.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::{BackendKind, Server};
use crate::error::{ConfigError, Result};

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub subprocess: SubprocessConfig,
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub fleet: Vec<Server>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Reconciliation loop timings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Seconds to sleep between full passes over the fleet.
    pub cycle_interval_secs: u64,
    /// Seconds to wait after a start/kill before re-probing.
    pub settle_interval_secs: u64,
    /// Upper bound on a single probe/kill request.
    pub probe_timeout_secs: u64,
    /// How many servers are reconciled concurrently within one pass.
    pub concurrency: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: 10,
            settle_interval_secs: 1,
            probe_timeout_secs: 3,
            concurrency: 4,
        }
    }
}

/// Subprocess backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubprocessConfig {
    /// Worker entry point argv; the server's netloc is appended.
    pub command: Vec<String>,
    pub working_dir: PathBuf,
}

impl Default for SubprocessConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            working_dir: PathBuf::from("."),
        }
    }
}

/// Container backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Worker entry point argv inside the container; netloc is appended.
    pub command: Vec<String>,
    /// Image build context, also mounted read-write into the container.
    pub build_context: PathBuf,
    /// Label value used to find and tag the worker image.
    pub image_label: String,
    /// Prefix for derived container names.
    pub container_prefix: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            build_context: PathBuf::from("."),
            image_label: "fleetlord_worker".into(),
            container_prefix: "fleetlord_".into(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.orchestrator.cycle_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "orchestrator.cycle_interval_secs",
                reason: "must be positive".into(),
            }
            .into());
        }

        let mut seen = std::collections::BTreeSet::new();
        for server in &self.fleet {
            if server.id.as_str().is_empty() {
                return Err(ConfigError::MissingField { field: "fleet.id" }.into());
            }
            if !seen.insert(server.id.clone()) {
                return Err(ConfigError::InvalidValue {
                    field: "fleet.id",
                    reason: format!("duplicate server id '{}'", server.id),
                }
                .into());
            }
            if server.netloc.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "fleet.netloc",
                }
                .into());
            }
            // Surface bad schemes at load time instead of on the first probe.
            server.base_url()?;
        }

        let uses = |kind: BackendKind| self.fleet.iter().any(|s| s.backend == kind);
        if uses(BackendKind::Subprocess) && self.subprocess.command.is_empty() {
            return Err(ConfigError::MissingField {
                field: "subprocess.command",
            }
            .into());
        }
        if uses(BackendKind::Container) && self.container.command.is_empty() {
            return Err(ConfigError::MissingField {
                field: "container.command",
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;
    use crate::error::Error;

    fn minimal_fleet_toml() -> &'static str {
        r#"
            [subprocess]
            command = ["python", "manage.py", "runserver"]

            [[fleet]]
            id = "wh-1"
            name = "Warehouse One"
            object_type = "warehouse"
            object_id = "1"
            scheme = "http"
            netloc = "127.0.0.1:9100"
        "#
    }

    #[test]
    fn parses_minimal_fleet_with_defaults() {
        let config: Config = toml::from_str(minimal_fleet_toml()).unwrap();
        config.validate().unwrap();

        let server = &config.fleet[0];
        assert_eq!(server.backend, BackendKind::Subprocess);
        assert_eq!(server.healthcheck_path, "/health/");
        assert_eq!(server.kill_path, "/kill/");
        assert_eq!(server.wanted_status, Status::Up);
        assert_eq!(server.last_known_status, Status::Down);

        assert_eq!(config.orchestrator.cycle_interval_secs, 10);
        assert_eq!(config.orchestrator.settle_interval_secs, 1);
    }

    #[test]
    fn docker_is_an_alias_for_container() {
        let toml = r#"
            [container]
            command = ["python", "manage.py", "runserver"]

            [[fleet]]
            id = "wh-1"
            name = "Warehouse One"
            object_type = "warehouse"
            object_id = "1"
            backend = "docker"
            scheme = "http"
            netloc = "127.0.0.1:9100"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.fleet[0].backend, BackendKind::Container);
    }

    #[test]
    fn rejects_unknown_backend_kind() {
        let toml = r#"
            [[fleet]]
            id = "wh-1"
            name = "Warehouse One"
            object_type = "warehouse"
            object_id = "1"
            backend = "lambda"
            scheme = "http"
            netloc = "127.0.0.1:9100"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn rejects_duplicate_server_ids() {
        let toml = r#"
            [subprocess]
            command = ["worker"]

            [[fleet]]
            id = "wh-1"
            name = "A"
            object_type = "warehouse"
            object_id = "1"
            scheme = "http"
            netloc = "127.0.0.1:9100"

            [[fleet]]
            id = "wh-1"
            name = "B"
            object_type = "warehouse"
            object_id = "2"
            scheme = "http"
            netloc = "127.0.0.1:9101"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_subprocess_fleet_without_command() {
        let toml = r#"
            [[fleet]]
            id = "wh-1"
            name = "A"
            object_type = "warehouse"
            object_id = "1"
            scheme = "http"
            netloc = "127.0.0.1:9100"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("subprocess.command"));
    }

    #[test]
    fn rejects_unsupported_scheme_at_load_time() {
        let toml = r#"
            [subprocess]
            command = ["worker"]

            [[fleet]]
            id = "wh-1"
            name = "A"
            object_type = "warehouse"
            object_id = "1"
            scheme = "ftp"
            netloc = "127.0.0.1:9100"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme { .. }));
    }

    #[test]
    fn rejects_zero_cycle_interval() {
        let toml = r#"
            [orchestrator]
            cycle_interval_secs = 0
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }
}
