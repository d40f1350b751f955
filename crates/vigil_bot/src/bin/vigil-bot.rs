//! Vigil - community automation bot.
//!
//! Runs both subsystems against one gateway connection: the presence-based
//! role reconciler and the staff application workflow, plus a small HTTP
//! healthcheck server.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vigil_bot::serve_api;
use vigil_core::{BotMetrics, VigilConfig, WorkflowEngine};
use vigil_discord::VigilBot;

/// Command-line arguments for the bot.
#[derive(Parser, Debug)]
#[command(name = "vigil-bot")]
#[command(about = "Vigil - presence role sync and staff applications for Discord")]
#[command(version)]
struct Args {
    /// Path to the bot configuration file
    #[arg(short, long, default_value = "vigil.toml")]
    config: PathBuf,

    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: Option<String>,

    /// Application (client) id
    #[arg(long, env = "CLIENT_ID")]
    client_id: Option<u64>,

    /// User id allowed to run admin commands
    #[arg(long, env = "OWNER_ID")]
    owner_id: Option<u64>,

    /// Healthcheck server port
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Validate configuration and exit without logging in
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(config_file = ?args.config, "Loading configuration");

    let config = Arc::new(VigilConfig::from_file(&args.config)?);
    info!(
        role = %config.role_name(),
        trigger = %config.status_trigger(),
        interval_ms = config.check_interval_ms(),
        positions = config.positions().len(),
        prefix_commands = config.prefix_commands_enabled(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("DRY RUN MODE - configuration is valid, exiting");
        return Ok(());
    }

    let token = args
        .discord_token
        .ok_or("DISCORD_TOKEN not provided")?;
    let owner_id = match args.owner_id {
        Some(id) => id,
        None => {
            warn!("OWNER_ID not set - owner commands will be rejected for everyone");
            0
        }
    };

    let metrics = BotMetrics::new();
    let engine = Arc::new(WorkflowEngine::new(config.clone()));

    serve_api(args.port, metrics.clone()).await?;

    let mut bot = VigilBot::new(
        token,
        args.client_id,
        owner_id,
        config,
        engine,
        metrics,
    )
    .await?;

    info!("Bot starting. Press CTRL+C to shut down.");

    tokio::select! {
        result = bot.start() => {
            // A gateway login failure lands here and exits non-zero.
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping");
        }
    }

    Ok(())
}
