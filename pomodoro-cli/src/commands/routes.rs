//! Implementation of the `pomodoro routes` command.

use colored::Colorize;
use pomodoro::prelude::{Settings, create_app};

pub fn execute() -> Result<(), String> {
    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    let app = create_app(settings).map_err(|e| e.to_string())?;

    for (method, pattern) in app.routes() {
        let method = format!("{:<7}", method.as_str());
        println!("  {} {}", method.green().bold(), pattern);
    }

    Ok(())
}
