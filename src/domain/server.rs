//! The managed server entity and its run-state machine.
//!
//! A [`Server`] pairs a domain object with a worker process reachable over
//! HTTP. The orchestrator compares the operator's [`wanted
//! status`](Server::wanted_status) against the last observed status and
//! derives the [`Action`] (if any) for the current cycle.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, Error, Result};

/// Stable identifier for a managed server.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct ServerId(String);

impl ServerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Observed or wanted run state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    #[default]
    Down,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Up => f.write_str("up"),
            Status::Down => f.write_str("down"),
        }
    }
}

/// Mechanism used to launch a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Subprocess,
    #[serde(alias = "docker")]
    Container,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Subprocess => f.write_str("subprocess"),
            BackendKind::Container => f.write_str("container"),
        }
    }
}

/// Action the orchestrator takes to converge a server this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Stop,
}

fn default_healthcheck_path() -> String {
    "/health/".into()
}

fn default_kill_path() -> String {
    "/kill/".into()
}

fn default_wanted() -> Status {
    Status::Up
}

/// A managed worker and its desired/observed run state.
///
/// `object_type` and `object_id` identify the domain object the worker
/// fronts; they are opaque to the orchestrator and only forwarded into the
/// worker's environment. The address (`scheme` + `netloc`) is immutable for
/// the lifetime of a reconciliation cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub id: ServerId,
    pub name: String,
    pub object_type: String,
    pub object_id: String,
    #[serde(default)]
    pub backend: BackendKind,
    pub scheme: String,
    pub netloc: String,
    #[serde(default = "default_healthcheck_path")]
    pub healthcheck_path: String,
    #[serde(default = "default_kill_path")]
    pub kill_path: String,
    /// Operator intent; mutated only externally, never by the orchestrator.
    #[serde(default = "default_wanted")]
    pub wanted_status: Status,
    /// Most recent probe result; mutated only by the probe client.
    #[serde(skip)]
    pub last_known_status: Status,
}

impl Server {
    /// Base URL of the worker (`scheme://netloc`).
    ///
    /// Only `http` and `https` are probeable; any other scheme is a
    /// configuration defect and fails with [`Error::UnsupportedScheme`].
    pub fn base_url(&self) -> Result<Url> {
        match self.scheme.as_str() {
            "http" | "https" => Ok(Url::parse(&format!("{}://{}", self.scheme, self.netloc))?),
            other => Err(Error::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }

    /// URL of the worker's health endpoint.
    pub fn health_url(&self) -> Result<Url> {
        Ok(self.base_url()?.join(&self.healthcheck_path)?)
    }

    /// URL of the worker's self-termination endpoint.
    pub fn kill_url(&self) -> Result<Url> {
        Ok(self.base_url()?.join(&self.kill_path)?)
    }

    /// Port parsed from `netloc`.
    pub fn port(&self) -> Result<u16> {
        let (_, port) = self
            .netloc
            .rsplit_once(':')
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "netloc",
                reason: format!("'{}' has no port", self.netloc),
            })?;
        port.parse().map_err(|_| {
            ConfigError::InvalidValue {
                field: "netloc",
                reason: format!("'{port}' is not a valid port"),
            }
            .into()
        })
    }

    /// Compare wanted vs. observed state and derive this cycle's action.
    #[must_use]
    pub fn pending_action(&self) -> Option<Action> {
        match (self.last_known_status, self.wanted_status) {
            (Status::Down, Status::Up) => Some(Action::Start),
            (Status::Up, Status::Down) => Some(Action::Stop),
            _ => None,
        }
    }
}

impl fmt::Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::test_server;

    #[test]
    fn pending_action_matrix() {
        let mut server = test_server("s1", "127.0.0.1:9100");

        server.wanted_status = Status::Up;
        server.last_known_status = Status::Down;
        assert_eq!(server.pending_action(), Some(Action::Start));

        server.wanted_status = Status::Down;
        server.last_known_status = Status::Up;
        assert_eq!(server.pending_action(), Some(Action::Stop));

        server.wanted_status = Status::Up;
        server.last_known_status = Status::Up;
        assert_eq!(server.pending_action(), None);

        server.wanted_status = Status::Down;
        server.last_known_status = Status::Down;
        assert_eq!(server.pending_action(), None);
    }

    #[test]
    fn base_url_rejects_non_http_schemes() {
        let mut server = test_server("s1", "127.0.0.1:9100");
        server.scheme = "ftp".into();

        let err = server.base_url().unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme { scheme } if scheme == "ftp"));
    }

    #[test]
    fn endpoint_urls_join_relative_paths() {
        let server = test_server("s1", "127.0.0.1:9100");

        assert_eq!(
            server.health_url().unwrap().as_str(),
            "http://127.0.0.1:9100/health/"
        );
        assert_eq!(
            server.kill_url().unwrap().as_str(),
            "http://127.0.0.1:9100/kill/"
        );
    }

    #[test]
    fn port_parses_from_netloc() {
        let server = test_server("s1", "127.0.0.1:9100");
        assert_eq!(server.port().unwrap(), 9100);

        let server = test_server("s1", "localhost");
        assert!(server.port().is_err());
    }

    #[test]
    fn status_displays_lowercase() {
        assert_eq!(Status::Up.to_string(), "up");
        assert_eq!(Status::Down.to_string(), "down");
    }
}
