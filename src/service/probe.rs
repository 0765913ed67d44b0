//! Health/kill protocol client.
//!
//! One HTTP request per call, no retries - retry cadence is owned by the
//! reconciliation loop. Transient network failures are never errors here;
//! they fold into the observed status.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::domain::{Server, Status};
use crate::error::Result;

pub struct ProbeClient {
    http: Client,
}

impl ProbeClient {
    /// Build a client whose requests are bounded by `timeout`.
    ///
    /// A probe that gets no response within the bound is treated as `down`
    /// (or as termination-successful for kills); it never hangs the loop.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Probe the server's health endpoint and record the result.
    ///
    /// Any response counts as `up`; a connection failure or timeout counts
    /// as `down`. The result is written to `server.last_known_status` before
    /// returning - there is no separate write step.
    pub async fn probe_health(&self, server: &mut Server) -> Result<Status> {
        let url = server.health_url()?;

        let status = match self.http.get(url).send().await {
            Ok(response) => {
                debug!(server = %server, code = %response.status(), "Health probe answered");
                Status::Up
            }
            Err(e) => {
                debug!(server = %server, error = %e, "Health probe failed");
                Status::Down
            }
        };

        server.last_known_status = status;
        Ok(status)
    }

    /// Fire a request at the server's kill endpoint.
    ///
    /// Returns `true` when the request fails to connect: the worker died
    /// before it could respond. A response means the kill was rejected or is
    /// not yet effective. A timeout is also treated as dead, which conflates
    /// "already dead" with "unreachable"; the debug line keeps the two
    /// distinguishable in logs.
    pub async fn request_kill(&self, server: &Server) -> Result<bool> {
        let url = server.kill_url()?;

        match self.http.get(url).send().await {
            Ok(response) => {
                debug!(server = %server, code = %response.status(), "Kill request answered; worker still up");
                Ok(false)
            }
            Err(e) if e.is_timeout() => {
                debug!(server = %server, "Kill request timed out; treating worker as dead");
                Ok(true)
            }
            Err(e) => {
                debug!(server = %server, error = %e, "Kill request failed to connect; worker is dead");
                Ok(true)
            }
        }
    }
}
