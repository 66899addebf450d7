use std::time::Duration;
use thiserror::Error;

use crate::error::command::CommandError;

/// The monitored server's status source could not be read.
///
/// "Server offline" is never a `ProbeUnavailable`; it is a valid state with
/// `online = false`. This error is transient and the polling components retry on
/// their next tick.
#[derive(Error, Debug)]
pub enum ProbeUnavailable {
    /// A local status command could not be run.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The whole fetch exceeded the probe timeout.
    #[error("Server status probe timed out after {0:?}")]
    TimedOut(Duration),

    /// Command output could not be interpreted.
    #[error("Failed to parse server status: {0}")]
    Parse(String),

    /// The blocking metrics task panicked or was cancelled.
    #[error("Metrics collection failed: {0}")]
    Metrics(String),
}
