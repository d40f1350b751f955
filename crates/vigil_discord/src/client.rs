//! Discord bot client setup and lifecycle management.
//!
//! This module provides the VigilBot struct which manages the Discord client
//! connection and wires the event handler to the shared services.

use crate::handler::VigilHandler;
use crate::reconciler::PresenceReconciler;
use crate::{DiscordError, DiscordErrorKind, DiscordResult};
use serenity::Client;
use serenity::model::id::ApplicationId;
use std::sync::Arc;
use tracing::{info, instrument};
use vigil_core::{BotMetrics, VigilConfig, WorkflowEngine};

/// Main Discord client for Vigil.
///
/// Owns the Serenity client; the workflow engine and metrics are shared with
/// the healthcheck server by the caller.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use vigil_core::{BotMetrics, VigilConfig, WorkflowEngine};
/// use vigil_discord::VigilBot;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Arc::new(VigilConfig::from_file("vigil.toml")?);
///     let engine = Arc::new(WorkflowEngine::new(config.clone()));
///     let metrics = BotMetrics::new();
///     let token = std::env::var("DISCORD_TOKEN")?;
///
///     let mut bot = VigilBot::new(token, None, 0, config, engine, metrics).await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct VigilBot {
    /// Serenity client instance
    client: Client,
}

impl VigilBot {
    /// Create a new VigilBot instance.
    ///
    /// # Arguments
    /// * `token` - Discord bot token from the Discord Developer Portal
    /// * `application_id` - Application (client) id; when absent, serenity
    ///   derives it from the gateway session
    /// * `owner_id` - The single user id allowed to run admin commands
    /// * `config` - Validated runtime configuration
    /// * `engine` - Shared workflow engine
    /// * `metrics` - Shared metrics collector
    ///
    /// # Errors
    /// Returns an error if the token is empty or the Serenity client fails to
    /// initialize.
    #[instrument(skip_all, fields(token_len = token.len()))]
    pub async fn new(
        token: String,
        application_id: Option<u64>,
        owner_id: u64,
        config: Arc<VigilConfig>,
        engine: Arc<WorkflowEngine>,
        metrics: BotMetrics,
    ) -> DiscordResult<Self> {
        if token.trim().is_empty() {
            return Err(DiscordError::new(DiscordErrorKind::InvalidToken));
        }

        info!("Initializing Vigil Discord bot");

        let reconciler = Arc::new(PresenceReconciler::new(config.clone(), metrics.clone()));
        let handler = VigilHandler::new(config, engine, reconciler, metrics, owner_id);
        let intents = VigilHandler::intents();

        info!("Building Serenity client with intents: {:?}", intents);

        let mut builder = Client::builder(&token, intents).event_handler(handler);
        if let Some(id) = application_id {
            builder = builder.application_id(ApplicationId::new(id));
        }

        let client = builder.await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Failed to build client: {}",
                e
            )))
        })?;

        info!("Serenity client built successfully");

        Ok(Self { client })
    }

    /// Start the Discord bot.
    ///
    /// This method blocks until the bot is shut down (e.g., via Ctrl+C).
    ///
    /// # Errors
    /// Returns an error if the client fails to start or encounters a fatal
    /// error; a failed login surfaces here.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> DiscordResult<()> {
        info!("Starting Discord bot");

        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Client error: {}",
                e
            )))
        })?;

        Ok(())
    }
}
