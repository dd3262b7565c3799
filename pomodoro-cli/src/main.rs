//! Pomodoro CLI - serve the application or smoke-check its home page.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "pomodoro")]
#[command(author, version, about = "Serve and check the Pomodoro web application", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Display version information
    Version,
    /// Serve the application over HTTP
    Serve {
        /// Host to bind to (defaults to POMODORO_HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (defaults to POMODORO_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check that the home page responds with the Pomodoro page
    Check,
    /// List all registered routes
    Routes,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("pomodoro {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { host, port }) => {
            let config = commands::serve::ServeConfig { host, port };
            if let Err(e) = commands::serve::execute(config) {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        Some(Commands::Check) => {
            let code = commands::check::execute();
            std::process::exit(code);
        }
        Some(Commands::Routes) => {
            if let Err(e) = commands::routes::execute() {
                eprintln!("{} {}", "Error:".red().bold(), e);
                std::process::exit(1);
            }
        }
        None => {
            println!("{}", "🍅 Pomodoro".bold().red());
            println!();
            println!("Run {} for usage information.", "pomodoro --help".cyan());
        }
    }
}
