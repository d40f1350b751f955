//! Gateway event handler.
//!
//! One handler instance owns the shared services (configuration, workflow
//! engine, reconciler, metrics) and routes every inbound event: readiness,
//! presence changes, interactions, and legacy prefix messages. Unexpected
//! failures inside a handler are logged and never tear the process down.

use crate::reconciler::PresenceReconciler;
use crate::{commands, prefix, reminder, workflow};
use async_trait::async_trait;
use serenity::model::application::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::{Presence, Ready};
use serenity::model::id::UserId;
use serenity::prelude::{Context, EventHandler, GatewayIntents};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, instrument};
use vigil_core::{BotMetrics, VigilConfig, WorkflowEngine};

/// Event handler wiring gateway events to the two subsystems.
pub struct VigilHandler {
    pub(crate) config: Arc<VigilConfig>,
    pub(crate) engine: Arc<WorkflowEngine>,
    pub(crate) reconciler: Arc<PresenceReconciler>,
    pub(crate) metrics: BotMetrics,
    pub(crate) owner_id: u64,
    /// Ready fires again on every gateway resume; loops start only once.
    loops_started: AtomicBool,
}

impl VigilHandler {
    /// Create a handler around the shared services.
    pub fn new(
        config: Arc<VigilConfig>,
        engine: Arc<WorkflowEngine>,
        reconciler: Arc<PresenceReconciler>,
        metrics: BotMetrics,
        owner_id: u64,
    ) -> Self {
        Self {
            config,
            engine,
            reconciler,
            metrics,
            owner_id,
            loops_started: AtomicBool::new(false),
        }
    }

    /// Gateway intents required by both subsystems.
    ///
    /// Presence reconciliation needs `GUILD_PRESENCES` and `GUILD_MEMBERS`;
    /// legacy prefix commands need `MESSAGE_CONTENT`.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_PRESENCES
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    /// Whether `user` is the statically configured owner.
    pub(crate) fn is_owner(&self, user: UserId) -> bool {
        user.get() == self.owner_id
    }
}

#[async_trait]
impl EventHandler for VigilHandler {
    #[instrument(skip(self, ctx, ready), fields(bot = %ready.user.tag()))]
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            guilds = ready.guilds.len(),
            trigger = %self.config.status_trigger(),
            role = %self.config.role_name(),
            interval_ms = self.config.check_interval_ms(),
            "Gateway session ready"
        );
        self.metrics.set_bot_tag(ready.user.tag());

        // A failed registration degrades to prefix commands; startup continues.
        commands::register_commands(&ctx).await;

        ctx.set_activity(Some(crate::conversions::watching_activity(
            self.config.status_trigger(),
        )));

        if !self.loops_started.swap(true, Ordering::SeqCst) {
            self.reconciler
                .clone()
                .spawn_sweep_loop(ctx.clone(), self.config.check_interval());

            if let Some(period) = self.config.reminder_interval() {
                reminder::spawn_reminder_loop(
                    ctx.clone(),
                    self.config.clone(),
                    self.reconciler.clone(),
                    period,
                );
            }
        }
    }

    async fn presence_update(&self, ctx: Context, new_data: Presence) {
        self.reconciler
            .reconcile_presence_event(&ctx, &new_data)
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let result = match &interaction {
            Interaction::Command(command) => {
                commands::dispatch_command(self, &ctx, command).await
            }
            Interaction::Component(component) => {
                workflow::handle_component(self, &ctx, component).await
            }
            Interaction::Modal(modal) => workflow::handle_modal(self, &ctx, modal).await,
            _ => Ok(()),
        };

        if let Err(e) = result {
            error!(error = %e, "Interaction handling failed");
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if !self.config.prefix_commands_enabled() || msg.author.bot {
            return;
        }
        if let Err(e) = prefix::handle_message(self, &ctx, &msg).await {
            error!(error = %e, "Prefix command handling failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(owner_id: u64) -> VigilHandler {
        let config = Arc::new(
            VigilConfig::default()
                .with_role_name("Pic Perms")
                .with_status_trigger("/Watchtower"),
        );
        let metrics = BotMetrics::new();
        let engine = Arc::new(WorkflowEngine::new(config.clone()));
        let reconciler = Arc::new(PresenceReconciler::new(config.clone(), metrics.clone()));
        VigilHandler::new(config, engine, reconciler, metrics, owner_id)
    }

    #[test]
    fn test_owner_gate_matches_configured_id_only() {
        let handler = handler(42);
        assert!(handler.is_owner(UserId::new(42)));
        assert!(!handler.is_owner(UserId::new(43)));
    }

    #[test]
    fn test_intents_cover_both_subsystems() {
        let intents = VigilHandler::intents();
        assert!(intents.contains(GatewayIntents::GUILD_PRESENCES));
        assert!(intents.contains(GatewayIntents::GUILD_MEMBERS));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
    }
}
