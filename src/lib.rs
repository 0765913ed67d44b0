//! Fleetlord - a reconciliation loop for object server fleets.
//!
//! Each managed server pairs a domain object with a worker process reachable
//! over HTTP. An operator declares a wanted run state per server; the
//! orchestrator continuously probes actual state via health checks and
//! drives it toward the wanted state by starting workers through a pluggable
//! backend or asking them to terminate through their kill endpoint.
//!
//! # Architecture
//!
//! - **[`domain`]** - The `Server` entity and its run-state machine.
//! - **[`port`]** - Traits the loop depends on: `ServerRegistry`, `Backend`.
//! - **[`adapter`]** - Implementations: config-seeded in-memory registry,
//!   subprocess backend, Docker backend (requires the `container` feature),
//!   and the closed `FleetBackend` dispatch over the two kinds.
//! - **[`service`]** - The health/kill protocol client and the
//!   reconciliation loop itself.
//! - **[`config`]** - TOML configuration and logging setup.
//! - **[`error`]** - Error taxonomy: transient network failures fold into
//!   observed status, backend failures are retried next cycle, configuration
//!   defects are fatal.
//!
//! # Features
//!
//! - `container` - Enable the Docker container backend (on by default)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use fleetlord::adapter::{FleetBackend, InMemoryRegistry};
//! use fleetlord::config::Config;
//! use fleetlord::service::{Orchestrator, ProbeClient};
//!
//! # async fn run() -> fleetlord::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let registry = Arc::new(InMemoryRegistry::from_servers(config.fleet.clone()));
//! let backend = Arc::new(FleetBackend::from_config(&config));
//! let probe = ProbeClient::new(Duration::from_secs(config.orchestrator.probe_timeout_secs))?;
//! Orchestrator::new(registry, backend, probe, config.orchestrator.clone())
//!     .run()
//!     .await
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
pub mod service;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
