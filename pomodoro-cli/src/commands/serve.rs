//! Implementation of the `pomodoro serve` command.

use colored::Colorize;
use pomodoro::prelude::{Settings, TracingConfig, create_app};

/// Command line overrides for the server address.
pub struct ServeConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Applies command line overrides on top of environment settings.
pub fn resolve_settings(config: ServeConfig, mut settings: Settings) -> Settings {
    if let Some(host) = config.host {
        settings.host = host;
    }
    if let Some(port) = config.port {
        settings.port = port;
    }
    settings
}

pub fn execute(config: ServeConfig) -> Result<(), String> {
    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    let settings = resolve_settings(config, settings);
    let addr = settings.addr();

    let app = create_app(settings.clone())
        .map_err(|e| e.to_string())?
        .with_tracing(TracingConfig::from_settings(&settings));

    println!(
        "{} Serving on {}",
        "INFO".blue().bold(),
        format!("http://{}", addr).cyan()
    );

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start runtime: {}", e))?;

    runtime
        .block_on(app.listen(&addr))
        .map_err(|e| format!("Server error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_settings_keeps_env_values() {
        let settings = resolve_settings(
            ServeConfig {
                host: None,
                port: None,
            },
            Settings::default(),
        );
        assert_eq!(settings.addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_resolve_settings_applies_overrides() {
        let settings = resolve_settings(
            ServeConfig {
                host: Some("0.0.0.0".to_string()),
                port: Some(8025),
            },
            Settings::default(),
        );
        assert_eq!(settings.addr(), "0.0.0.0:8025");
    }
}
