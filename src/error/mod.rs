//! Error types for the bot.
//!
//! `AppError` is the top-level error returned from startup and from the long-running
//! bot tasks. Component failures that are expected during normal operation (probe
//! failures, display failures, control failures) have their own types so that each
//! component can degrade and recover on its own without going through `AppError`.

pub mod command;
pub mod config;
pub mod control;
pub mod display;
pub mod probe;

use thiserror::Error;

use crate::error::config::ConfigError;

/// Top-level application error type.
///
/// Only configuration errors are fatal in practice. The remaining variants surface
/// when the Discord client or the tick scheduler cannot be started at all.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup.
    ///
    /// Aborts startup; the message names the missing or malformed key.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Tick scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Failed to install the shutdown signal handler.
    #[error("Failed to listen for shutdown signal: {0}")]
    SignalErr(#[source] std::io::Error),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}
