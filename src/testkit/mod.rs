//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] — Builders for [`Server`](crate::domain::Server) records.
//! - [`backend`] — Recording/failing fake [`Backend`](crate::port::Backend).
//! - [`registry`] — Registry wrapper that fails status writes on demand.
//! - [`http`] — Minimal scriptable HTTP worker stub over a real socket.

pub mod backend;
pub mod domain;
pub mod http;
pub mod registry;
