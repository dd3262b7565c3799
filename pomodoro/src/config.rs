//! Configuration loading from environment variables
//!
//! Settings are read from `POMODORO_*` variables, optionally seeded from a
//! `.env` file. Missing variables fall back to defaults; values that are
//! present but malformed are errors, so a bad deployment fails at startup
//! instead of serving with surprising values.

use std::env;
use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;

pub const HOST_VAR: &str = "POMODORO_HOST";
pub const PORT_VAR: &str = "POMODORO_PORT";
pub const WORK_MINUTES_VAR: &str = "POMODORO_WORK_MINUTES";
pub const SHORT_BREAK_MINUTES_VAR: &str = "POMODORO_SHORT_BREAK_MINUTES";
pub const LONG_BREAK_MINUTES_VAR: &str = "POMODORO_LONG_BREAK_MINUTES";
pub const LOG_JSON_VAR: &str = "POMODORO_LOG_JSON";

/// Longest session or break the application accepts, in minutes.
pub const MAX_MINUTES: u32 = 180;

/// Load environment variables from a `.env` file if it exists.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Parse a variable looked up through `source`, using `default` when unset.
fn parsed_or<T: FromStr>(
    source: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match source(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
    }
}

/// Configuration loading errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Invalid value '{value}' for environment variable '{key}' (failed to parse as expected type)"
    )]
    Invalid { key: String, value: String },

    #[error("Value {value} for '{key}' is out of range ({min}..={max})")]
    OutOfRange {
        key: String,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Runtime settings for the Pomodoro application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub work_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            log_json: false,
        }
    }
}

impl Settings {
    /// Loads settings from the process environment (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Loads settings from an arbitrary key lookup.
    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let settings = Self {
            host: source(HOST_VAR).unwrap_or(defaults.host),
            port: parsed_or(&source, PORT_VAR, defaults.port)?,
            work_minutes: parsed_or(&source, WORK_MINUTES_VAR, defaults.work_minutes)?,
            short_break_minutes: parsed_or(
                &source,
                SHORT_BREAK_MINUTES_VAR,
                defaults.short_break_minutes,
            )?,
            long_break_minutes: parsed_or(
                &source,
                LONG_BREAK_MINUTES_VAR,
                defaults.long_break_minutes,
            )?,
            log_json: parsed_or(&source, LOG_JSON_VAR, defaults.log_json)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Checks that every duration lies in `1..=MAX_MINUTES`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            (WORK_MINUTES_VAR, self.work_minutes),
            (SHORT_BREAK_MINUTES_VAR, self.short_break_minutes),
            (LONG_BREAK_MINUTES_VAR, self.long_break_minutes),
        ];

        for (key, value) in durations {
            if !(1..=MAX_MINUTES).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    key: key.to_string(),
                    value,
                    min: 1,
                    max: MAX_MINUTES,
                });
            }
        }

        Ok(())
    }

    /// The `host:port` address to bind. IPv6 literals are bracketed.
    pub fn addr(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(IpAddr::V6(ip)) => format!("[{}]:{}", ip, self.port),
            _ => format!("{}:{}", self.host, self.port),
        }
    }
}
