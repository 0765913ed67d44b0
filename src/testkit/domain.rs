//! Builders for domain records used across tests.

use crate::domain::{Server, ServerId, Status};

/// A subprocess-backed server with canonical defaults.
#[must_use]
pub fn test_server(id: &str, netloc: &str) -> Server {
    Server {
        id: ServerId::new(id),
        name: id.to_string(),
        object_type: "warehouse".into(),
        object_id: "1".into(),
        backend: Default::default(),
        scheme: "http".into(),
        netloc: netloc.into(),
        healthcheck_path: "/health/".into(),
        kill_path: "/kill/".into(),
        wanted_status: Status::Up,
        last_known_status: Status::Down,
    }
}
