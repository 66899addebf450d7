use thiserror::Error;

/// Failure talking to the messaging platform.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The gateway connection is not established yet (no shard to send through).
    #[error("Not connected to the Discord gateway")]
    NotConnected,

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    Discord(#[from] Box<serenity::Error>),
}

impl From<serenity::Error> for PlatformError {
    fn from(err: serenity::Error) -> Self {
        PlatformError::Discord(Box::new(err))
    }
}

/// Failure pushing to the live status surface.
#[derive(Error, Debug)]
pub enum DisplayError {
    /// The tracked message no longer exists (deleted externally).
    ///
    /// Recovered by recreating the surface once.
    #[error("Live status message no longer exists")]
    SurfaceInvalid,

    /// Any other platform failure; the tick is treated as degraded.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl From<serenity::Error> for DisplayError {
    fn from(err: serenity::Error) -> Self {
        DisplayError::Platform(PlatformError::from(err))
    }
}
