use std::time::Duration;
use thiserror::Error;

/// Failure running a local command against the monitored server.
#[derive(Error, Debug)]
pub enum CommandError {
    /// The program could not be started (missing binary, permissions).
    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The program did not finish within its timeout and was killed.
    #[error("`{program}` did not finish within {timeout:?}")]
    TimedOut {
        /// Program that timed out
        program: String,
        /// The timeout that elapsed
        timeout: Duration,
    },

    /// The program exited unsuccessfully.
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        /// Program that failed
        program: String,
        /// Exit status as reported by the OS
        status: String,
        /// Trimmed standard error output
        stderr: String,
    },
}
