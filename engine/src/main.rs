// Menubot
// Main entry point for the menubot binary

use clap::Parser;
use menubot_engine::cli::{Cli, Command};
use menubot_engine::config::Config;
use menubot_engine::handlers::{
    handle_doctor, handle_menu, handle_orders, handle_serve, handle_simulate, OutputFormat,
};
use menubot_engine::telemetry::{init_telemetry, init_telemetry_with_level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = match &cli.config {
        Some(config_path) => Config::load_from_path(config_path),
        None => Config::load_or_create(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            init_telemetry();
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // --log beats config; RUST_LOG beats both
    init_telemetry_with_level(cli.log.as_deref().unwrap_or(&config.core.log_level));
    tracing::info!("Menubot v{} ({} - {})", version, commit, timestamp);

    match cli.command {
        Command::Serve { port } => {
            tracing::info!("Starting server...");
            handle_serve(&config, port).await
        }

        Command::Orders { limit } => {
            tracing::debug!("Showing last {} orders", limit);
            handle_orders(limit, &config, format).await
        }

        Command::Menu => handle_menu(&config, format),

        Command::Simulate { user } => {
            tracing::debug!("Simulating conversation as {}", user);
            handle_simulate(&user, &config, format).await
        }

        Command::Doctor => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, format).await
        }
    }
}
