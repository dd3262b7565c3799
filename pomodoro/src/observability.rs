//! Logging setup.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::Settings;

/// Configuration for the tracing subscriber.
///
/// `RUST_LOG` overrides `level` when it is set.
///
/// # Examples
///
/// ```no_run
/// use pomodoro::observability::TracingConfig;
///
/// TracingConfig::new().json().init();
/// ```
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub json: bool,
    pub level: Level,
    /// Include the target (module path) in logs.
    pub with_target: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: Level::INFO,
            with_target: true,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives the output format from application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            json: settings.log_json,
            ..Self::default()
        }
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Installs the global subscriber. Later calls are ignored.
    pub fn init(self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string()));

        let builder = fmt()
            .with_env_filter(filter)
            .with_target(self.with_target);

        let result = if self.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };

        if result.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    }
}
