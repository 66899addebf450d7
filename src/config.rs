//! Startup configuration.
//!
//! Configuration is read once at startup and shared immutably afterwards. Keys are
//! taken from a JSON file when one exists (snake_case keys), otherwise from
//! environment variables (upper-case keys, `.env` supported through `dotenvy`).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::config::ConfigError;

const DEFAULT_CONFIG_PATH: &str = "/opt/bot-config.json";
const CONFIG_PATH_VAR: &str = "BOT_CONFIG_PATH";

const DEFAULT_STATUS_INTERVAL_SECS: u64 = 60;
const DEFAULT_PRESENCE_INTERVAL_SECS: u64 = 120;
const DEFAULT_COUNTER_INTERVAL_SECS: u64 = 300;
const DEFAULT_MEMBERSHIP_POLL_SECS: u64 = 30;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_JOURNAL_WINDOW: usize = 500;
const DEFAULT_SERVICE_PORT: u16 = 10998;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub guild_id: u64,
    pub live_status_channel_id: u64,
    /// Channel for join/leave notifications; `None` disables notifications.
    pub notification_channel_id: Option<u64>,
    /// Channel renamed to show the online user count; `None` disables it.
    pub counter_channel_id: Option<u64>,

    pub status_interval: Duration,
    pub presence_interval: Duration,
    pub counter_interval: Duration,
    pub membership_poll_interval: Duration,

    pub command_prefix: String,
    pub admin_user_ids: Vec<u64>,

    /// Human readable name of the monitored server, used in embed titles.
    pub server_name: String,
    pub service_unit: String,
    pub service_process_name: String,
    pub service_port: u16,
    pub probe_timeout: Duration,
    pub journal_window: usize,
}

impl Config {
    /// Loads configuration from the config file if present, otherwise from the environment.
    ///
    /// The file path defaults to `/opt/bot-config.json` and can be overridden with
    /// `BOT_CONFIG_PATH`.
    ///
    /// # Returns
    /// - `Ok(Config)` - All required keys present and valid
    /// - `Err(ConfigError)` - Missing required key, malformed value, or unreadable file
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if Path::new(&path).exists() {
            let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
                path: path.clone(),
                source,
            })?;
            return Self::from_json(&path, &raw);
        }

        Self::from_env()
    }

    /// Builds configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from the contents of a JSON config file.
    ///
    /// Keys are the lower-case form of the environment variable names. Numbers and
    /// arrays are accepted where the environment would carry a string.
    pub fn from_json(path: &str, raw: &str) -> Result<Self, ConfigError> {
        let map: HashMap<String, serde_json::Value> =
            serde_json::from_str(raw).map_err(|source| ConfigError::ParseFile {
                path: path.to_string(),
                source,
            })?;

        Self::from_lookup(|key| {
            map.get(&key.to_lowercase()).and_then(|value| match value {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Array(items) => Some(
                    items
                        .iter()
                        .map(|item| match item {
                            serde_json::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(","),
                ),
                other => Some(other.to_string()),
            })
        })
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Arguments
    /// - `lookup` - Returns the raw value for an upper-case key, if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let service_unit = get("SERVICE_UNIT").unwrap_or_else(|| "aooserver".to_string());

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            guild_id: parse_id("GUILD_ID", &required("GUILD_ID")?)?,
            live_status_channel_id: parse_id(
                "LIVE_STATUS_CHANNEL_ID",
                &required("LIVE_STATUS_CHANNEL_ID")?,
            )?,
            notification_channel_id: get("NOTIFICATION_CHANNEL_ID")
                .map(|v| parse_id("NOTIFICATION_CHANNEL_ID", &v))
                .transpose()?,
            counter_channel_id: get("COUNTER_CHANNEL_ID")
                .map(|v| parse_id("COUNTER_CHANNEL_ID", &v))
                .transpose()?,
            status_interval: parse_secs(
                "STATUS_INTERVAL_SECS",
                get("STATUS_INTERVAL_SECS"),
                DEFAULT_STATUS_INTERVAL_SECS,
            )?,
            presence_interval: parse_secs(
                "PRESENCE_INTERVAL_SECS",
                get("PRESENCE_INTERVAL_SECS"),
                DEFAULT_PRESENCE_INTERVAL_SECS,
            )?,
            counter_interval: parse_secs(
                "COUNTER_INTERVAL_SECS",
                get("COUNTER_INTERVAL_SECS"),
                DEFAULT_COUNTER_INTERVAL_SECS,
            )?,
            membership_poll_interval: parse_secs(
                "MEMBERSHIP_POLL_SECS",
                get("MEMBERSHIP_POLL_SECS"),
                DEFAULT_MEMBERSHIP_POLL_SECS,
            )?,
            command_prefix: get("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string()),
            admin_user_ids: get("ADMIN_USER_IDS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(|id| parse_id("ADMIN_USER_IDS", id))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?
                .unwrap_or_default(),
            server_name: get("SERVER_NAME").unwrap_or_else(|| "Voice Relay".to_string()),
            service_process_name: get("SERVICE_PROCESS_NAME")
                .unwrap_or_else(|| service_unit.clone()),
            service_unit,
            service_port: parse_number("SERVICE_PORT", get("SERVICE_PORT"), DEFAULT_SERVICE_PORT)?,
            probe_timeout: parse_secs(
                "PROBE_TIMEOUT_SECS",
                get("PROBE_TIMEOUT_SECS"),
                DEFAULT_PROBE_TIMEOUT_SECS,
            )?,
            journal_window: parse_number(
                "JOURNAL_WINDOW",
                get("JOURNAL_WINDOW"),
                DEFAULT_JOURNAL_WINDOW,
            )?,
        })
    }
}

/// Parses a Discord snowflake; zero is rejected since Discord never issues it.
fn parse_id(key: &str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(invalid(key, value)),
    }
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let secs: u64 = parse_number(key, value, default)?;
    if secs == 0 {
        return Err(invalid(key, "0"));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_number<T: std::str::FromStr>(
    key: &str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| invalid(key, &raw)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DISCORD_TOKEN", "token"),
        ("GUILD_ID", "123456789"),
        ("LIVE_STATUS_CHANNEL_ID", "987654321"),
    ];

    /// Tests loading a configuration with only the required keys.
    ///
    /// Verifies that optional components are disabled and defaults are applied.
    ///
    /// Expected: Ok with notification and counter channels unset
    #[test]
    fn applies_defaults_for_optional_keys() {
        let config = Config::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.guild_id, 123456789);
        assert_eq!(config.live_status_channel_id, 987654321);
        assert_eq!(config.notification_channel_id, None);
        assert_eq!(config.counter_channel_id, None);
        assert_eq!(config.status_interval, Duration::from_secs(60));
        assert_eq!(config.presence_interval, Duration::from_secs(120));
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.service_unit, "aooserver");
        assert_eq!(config.service_process_name, "aooserver");
        assert_eq!(config.service_port, 10998);
        assert!(config.admin_user_ids.is_empty());
    }

    /// Tests that a missing token aborts configuration.
    ///
    /// Expected: Err(MissingEnvVar("DISCORD_TOKEN"))
    #[test]
    fn missing_token_is_fatal() {
        let result = Config::from_lookup(lookup_from(&REQUIRED[1..]));

        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "DISCORD_TOKEN"));
    }

    /// Tests that an empty value counts as missing.
    #[test]
    fn blank_required_value_is_missing() {
        let result = Config::from_lookup(lookup_from(&[
            ("DISCORD_TOKEN", "token"),
            ("GUILD_ID", "  "),
            ("LIVE_STATUS_CHANNEL_ID", "1"),
        ]));

        assert!(matches!(result, Err(ConfigError::MissingEnvVar(key)) if key == "GUILD_ID"));
    }

    /// Tests rejecting a non-numeric channel id.
    ///
    /// Expected: Err(InvalidValue) naming the key
    #[test]
    fn rejects_malformed_channel_id() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("NOTIFICATION_CHANNEL_ID", "general"));

        let result = Config::from_lookup(lookup_from(&pairs));

        assert!(
            matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "NOTIFICATION_CHANNEL_ID")
        );
    }

    /// Tests overriding intervals and parsing the admin list.
    #[test]
    fn reads_overrides() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("STATUS_INTERVAL_SECS", "15"),
            ("COUNTER_CHANNEL_ID", "555"),
            ("ADMIN_USER_IDS", "11, 22,,33"),
            ("SERVICE_PROCESS_NAME", "aoo"),
        ]);

        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.status_interval, Duration::from_secs(15));
        assert_eq!(config.counter_channel_id, Some(555));
        assert_eq!(config.admin_user_ids, vec![11, 22, 33]);
        assert_eq!(config.service_process_name, "aoo");
    }

    /// Tests that a zero interval is rejected rather than spinning the scheduler.
    #[test]
    fn rejects_zero_interval() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PRESENCE_INTERVAL_SECS", "0"));

        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    /// Tests reading the JSON config file format.
    ///
    /// Verifies that numeric ids, null optionals and array admin lists are accepted.
    ///
    /// Expected: Ok with values taken from the JSON object
    #[test]
    fn reads_json_config() {
        let raw = r#"{
            "discord_token": "abc",
            "guild_id": 42,
            "live_status_channel_id": "43",
            "notification_channel_id": null,
            "counter_channel_id": 44,
            "admin_user_ids": [1, "2"]
        }"#;

        let config = Config::from_json("bot-config.json", raw).unwrap();

        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.guild_id, 42);
        assert_eq!(config.live_status_channel_id, 43);
        assert_eq!(config.notification_channel_id, None);
        assert_eq!(config.counter_channel_id, Some(44));
        assert_eq!(config.admin_user_ids, vec![1, 2]);
    }

    /// Tests that a malformed config file reports the path.
    #[test]
    fn malformed_json_is_an_error() {
        let result = Config::from_json("bot-config.json", "not json");

        assert!(matches!(result, Err(ConfigError::ParseFile { path, .. }) if path == "bot-config.json"));
    }
}
