//! Access to the monitored server.
//!
//! This is the only place that touches the monitored server. Everything else reads
//! its state through `ServerStateSource` and issues actions through `ServerControl`,
//! which lets tests substitute deterministic fakes for the systemd-backed
//! implementations.
//!
//! - `probe` - `SystemdProbe`, read-only status from systemd, the journal and sysinfo
//! - `controller` - `SystemdController`, restart and log tailing
//! - `journal` - replay of group join/leave log lines into groups
//! - `process` - bounded subprocess execution shared by both

pub mod controller;
pub mod journal;
pub mod probe;
pub mod process;

use serenity::async_trait;

use crate::{
    error::{control::ControlError, probe::ProbeUnavailable},
    model::server_state::ServerState,
};

/// Read-only view of the monitored server.
#[async_trait]
pub trait ServerStateSource: Send + Sync {
    /// Fetches a fresh snapshot.
    ///
    /// # Returns
    /// - `Ok(ServerState)` - Snapshot, with `online = false` if the server is not running
    /// - `Err(ProbeUnavailable)` - The status source could not be read or timed out
    async fn fetch(&self) -> Result<ServerState, ProbeUnavailable>;
}

/// Control actions against the monitored server.
#[async_trait]
pub trait ServerControl: Send + Sync {
    /// Issues a restart signal.
    ///
    /// Succeeds once the service manager accepted the request; it does not wait for
    /// the server to come back up.
    async fn restart(&self) -> Result<(), ControlError>;

    /// Returns at most `lines` recent log lines, most recent last.
    ///
    /// An empty log yields an empty vector, not an error.
    async fn tail_logs(&self, lines: usize) -> Result<Vec<String>, ControlError>;
}
