use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required configuration key is not set.
    ///
    /// The bot cannot start without a token, a guild and a live status channel.
    /// Set the key in the config file or as an environment variable.
    #[error("Missing required configuration key: {0}")]
    MissingEnvVar(String),

    /// Configuration key is set but cannot be parsed.
    #[error("Invalid value '{value}' for configuration key {key}")]
    InvalidValue {
        /// The configuration key
        key: String,
        /// The raw value that failed to parse
        value: String,
    },

    /// The config file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        /// Path of the config file
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not a JSON object.
    #[error("Failed to parse config file {path}: {source}")]
    ParseFile {
        /// Path of the config file
        path: String,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}
