//! MongoDB Atlas MCP server launcher.
//!
//! # Architecture Overview
//!
//! ```text
//!   atlas-launcher
//!        │
//!        ▼
//!   ┌──────────┐   ┌──────────────────────── lifecycle ─────────────────────────┐
//!   │  config  │──▶│ interpreter → manifest → install → .env → connection test  │
//!   └──────────┘   └───────────────────────────────┬─────────────────────────────┘
//!                                                  │ exit 0
//!                                                  ▼
//!                                       ┌─────────────────────┐
//!      SIGINT / SIGTERM ───────────────▶│ process::supervisor │──▶ server (foreground)
//!                                       └─────────────────────┘
//! ```
//!
//! Any failed step prints a message and exits 1. Once the server runs, its
//! exit code becomes the launcher's.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Instrument;
use uuid::Uuid;

use atlas_launcher::config::resolve_config;
use atlas_launcher::error::FAILURE_EXIT_CODE;
use atlas_launcher::lifecycle::{signals, Bootstrap, LaunchPlan, Shutdown};
use atlas_launcher::observability::{init_logging, LogFormat};
use atlas_launcher::BootstrapError;

#[derive(Parser)]
#[command(name = "atlas-launcher")]
#[command(about = "Prepare the environment and launch the MongoDB Atlas MCP server", long_about = None)]
struct Cli {
    /// Launcher settings (TOML). Defaults to <WORKDIR>/launcher.toml when present.
    #[arg(short, long, env = "ATLAS_LAUNCHER_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the manifest, environment file and server.
    #[arg(short = 'C', long, default_value = ".")]
    workdir: PathBuf,

    /// Log output format: pretty or json.
    #[arg(long, env = "ATLAS_LAUNCHER_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Run every check, then launch the server (default)
    Run,
    /// Run every check without launching the server
    Check,
    /// Print the effective launcher configuration as JSON
    ShowConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("bootstrap", %run_id);

    match execute(cli).instrument(span).await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {}", err);
            if matches!(err, BootstrapError::ExternalCheckFailed { .. }) {
                eprintln!("Fix the connection settings in the environment file and run again.");
            }
            ExitCode::from(err.exit_code())
        }
    }
}

async fn execute(cli: Cli) -> Result<u8, BootstrapError> {
    let (config, source) = resolve_config(cli.config.as_deref(), &cli.workdir)?;
    match &source {
        Some(path) => tracing::info!(path = %path.display(), "Configuration loaded"),
        None => tracing::info!("No launcher.toml found, using built-in defaults"),
    }

    let bootstrap = Bootstrap::new(config, cli.workdir);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::ShowConfig => match serde_json::to_string_pretty(bootstrap.config()) {
            Ok(json) => {
                println!("{}", json);
                Ok(0)
            }
            Err(e) => {
                eprintln!("Error: failed to render configuration: {}", e);
                Ok(FAILURE_EXIT_CODE)
            }
        },
        Commands::Check => {
            let plan = preflight(&bootstrap).await?;
            println!(
                "Preflight passed (interpreter {}); ready to launch.",
                plan.interpreter.display()
            );
            Ok(0)
        }
        Commands::Run => {
            let plan = preflight(&bootstrap).await?;

            let shutdown = Shutdown::new();
            match signals::listen(shutdown.clone()) {
                Ok(listener) => {
                    tokio::spawn(listener);
                }
                Err(e) => tracing::error!(error = %e, "Failed to install signal handlers"),
            }

            println!("Starting server. Press Ctrl+C to stop.");
            let exit = bootstrap.launch(&plan, &shutdown).await?;
            Ok(exit.exit_code())
        }
    }
}

/// Preflight, printing setup instructions when the template was just copied.
async fn preflight(bootstrap: &Bootstrap) -> Result<LaunchPlan, BootstrapError> {
    let result = bootstrap.preflight().await;
    if let Err(BootstrapError::SetupRequired { env_file, .. }) = &result {
        println!("Created {} from template.", env_file.display());
        for line in &bootstrap.config().environment.setup_instructions {
            println!("{}", line);
        }
    }
    result
}
