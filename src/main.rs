//! Bot launcher
//!
//! Startup sequence for the bot container.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        BOT LAUNCHER                          │
//!   │                                                              │
//!   │  ┌────────┐   ┌──────────┐   ┌──────────┐   ┌────────────┐   │
//!   │  │ config │──▶│ service  │──▶│ readiness│──▶│ verify     │   │
//!   │  │ + env  │   │ (spawn)  │   │ poll     │   │ (gate)     │   │
//!   │  └────────┘   └────┬─────┘   └──────────┘   └─────┬──────┘   │
//!   │                    │                     fail     │   pass   │
//!   │                    ◀───────── SIGTERM ────────────┤          │
//!   │                                                   ▼          │
//!   │                                           ┌────────────┐     │
//!   │                                           │ exec worker│     │
//!   │                                           └────────────┘     │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exit status is 1 when verification fails, 2 for bad configuration, and
//! 130 (SIGINT) or 143 (SIGTERM) when interrupted during startup. After the
//! handoff it is the worker's own status.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use bot_launcher::config::loader::{load_config, CONFIG_PATH_ENV};
use bot_launcher::lifecycle::{Orchestrator, Shutdown, SignalListener};
use bot_launcher::observability::init_logging;

#[derive(Parser)]
#[command(name = "bot-launcher")]
#[command(
    about = "Start the web service, verify, then hand off to the bot worker",
    long_about = None
)]
struct Cli {
    /// TOML configuration file (defaults to $LAUNCHER_CONFIG, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the resolved configuration and exit without launching anything
    #[arg(long)]
    check_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("bot-launcher: {}", e);
            return ExitCode::from(2);
        }
    };

    if cli.check_config {
        return match toml::to_string_pretty(&config) {
            Ok(rendered) => {
                print!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("bot-launcher: {}", e);
                ExitCode::from(2)
            }
        };
    }

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?config_path,
        "bot-launcher starting"
    );

    let shutdown = Shutdown::new();
    match SignalListener::install() {
        Ok(listener) => {
            listener.spawn(shutdown.clone());
        }
        Err(e) => tracing::warn!(error = %e, "Could not install signal handlers"),
    }

    let orchestrator = Orchestrator::new(config).with_shutdown(shutdown.subscribe());
    match orchestrator.run().await {
        Ok(never) => match never {},
        Err(e) => {
            tracing::error!(error = %e, "Startup aborted");
            ExitCode::from(e.exit_code())
        }
    }
}
