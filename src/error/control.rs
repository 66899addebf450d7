use thiserror::Error;

use crate::error::command::CommandError;

/// A control action against the monitored server could not be issued.
///
/// Surfaced to the invoking admin as a reply; never retried automatically.
#[derive(Error, Debug)]
pub enum ControlError {
    /// The service manager rejected or could not run the request.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The log source for the monitored server is unavailable.
    #[error("Server logs are unavailable: {0}")]
    LogsUnavailable(String),
}
