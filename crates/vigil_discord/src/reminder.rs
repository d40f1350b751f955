//! Periodic promotional reminder posts.
//!
//! Optional loop that advertises the status marker in each guild's general
//! channel. Entirely best-effort: a guild without a matching channel, or a
//! failed send, is skipped until the next tick.

use crate::reconciler::PresenceReconciler;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::Colour;
use serenity::model::channel::ChannelType;
use serenity::model::id::GuildId;
use serenity::prelude::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use vigil_core::VigilConfig;

/// Spawn the reminder loop with the configured period.
pub(crate) fn spawn_reminder_loop(
    ctx: Context,
    config: Arc<VigilConfig>,
    reconciler: Arc<PresenceReconciler>,
    period: Duration,
) {
    info!(period_secs = period.as_secs(), "Starting reminder loop");
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; skip it so guilds are not posted
        // to at startup.
        interval.tick().await;
        loop {
            interval.tick().await;
            for guild_id in ctx.cache.guilds() {
                if let Err(e) = remind_guild(&ctx, &config, &reconciler, guild_id).await {
                    debug!(guild_id = guild_id.get(), error = %e, "Reminder skipped");
                }
            }
        }
    });
}

async fn remind_guild(
    ctx: &Context,
    config: &VigilConfig,
    reconciler: &PresenceReconciler,
    guild_id: GuildId,
) -> Result<(), serenity::Error> {
    let channels = guild_id.channels(&ctx.http).await?;
    let Some(general) = channels
        .values()
        .find(|c| c.kind == ChannelType::Text && c.name.to_lowercase().contains("general"))
    else {
        return Ok(());
    };

    let (with_role, total) = match reconciler.resolve_role(ctx, guild_id).await {
        Some(role) => {
            let members = guild_id.members(&ctx.http, None, None).await?;
            let humans: Vec<_> = members.iter().filter(|m| !m.user.bot).collect();
            let with_role = humans.iter().filter(|m| m.roles.contains(&role)).count();
            (with_role, humans.len())
        }
        None => (0, 0),
    };

    let seconds = config.check_interval().as_secs();
    let embed = CreateEmbed::new()
        .title(format!("🖼️ Want the {} role?", config.role_name()))
        .description(format!(
            "**Put `{}` in your status to get the `{}` role!**",
            config.status_trigger(),
            config.role_name()
        ))
        .colour(Colour::new(0x800080))
        .field(
            "⚡ Instant & automatic",
            format!(
                "• The bot checks every **{seconds} seconds**\n\
                 • Remove the marker and the role goes away automatically"
            ),
            false,
        )
        .field(
            "📊 Current stats",
            format!("**{with_role}**/{total} members have the role"),
            true,
        );

    general
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}
